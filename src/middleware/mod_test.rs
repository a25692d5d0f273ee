use std::sync::{Arc, Mutex};

use http::{Method, StatusCode, Uri};

use super::{Chain, Middleware};
use crate::error::ConfigError;
use crate::handler::{BoxedHandler, boxed};
use crate::{Request, Response};

type Trace = Arc<Mutex<Vec<String>>>;

fn recording(tag: &'static str, trace: Trace) -> impl Middleware {
    move |next: BoxedHandler| -> BoxedHandler {
        let trace = Arc::clone(&trace);
        boxed(move |req: Request| {
            let next = Arc::clone(&next);
            let trace = Arc::clone(&trace);
            async move {
                trace.lock().unwrap().push(format!("{tag}:in"));
                let res = next.call(req).await;
                trace.lock().unwrap().push(format!("{tag}:out"));
                res
            }
        })
    }
}

fn base(trace: Trace) -> BoxedHandler {
    boxed(move |_req: Request| {
        let trace = Arc::clone(&trace);
        async move {
            trace.lock().unwrap().push("base".to_string());
            Response::text("ok")
        }
    })
}

fn request() -> Request {
    Request::new(Method::GET, Uri::from_static("/x"))
}

struct Named(&'static str);

impl Middleware for Named {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        next
    }

    fn name(&self) -> Option<&'static str> {
        Some(self.0)
    }
}

mod build {
    use super::*;

    #[tokio::test]
    async fn should_call_base_directly_given_empty_chain() {
        let trace = Trace::default();

        let handler = Chain::new().build(base(Arc::clone(&trace)));
        let res = handler.call(request()).await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(*trace.lock().unwrap(), ["base"]);
    }

    #[tokio::test]
    async fn should_make_first_registered_outermost() {
        let trace = Trace::default();
        let chain = Chain::new()
            .with(recording("a", Arc::clone(&trace)))
            .and_then(|c| c.with(recording("b", Arc::clone(&trace))))
            .and_then(|c| c.with(recording("c", Arc::clone(&trace))))
            .unwrap();

        chain.build(base(Arc::clone(&trace))).call(request()).await;

        assert_eq!(
            *trace.lock().unwrap(),
            ["a:in", "b:in", "c:in", "base", "c:out", "b:out", "a:out"]
        );
    }

    #[tokio::test]
    async fn should_observe_different_order_given_swapped_registration() {
        let ab = Trace::default();
        let ba = Trace::default();

        let mut chain_ab = Chain::new();
        chain_ab.push(recording("a", Arc::clone(&ab))).unwrap();
        chain_ab.push(recording("b", Arc::clone(&ab))).unwrap();
        let mut chain_ba = Chain::new();
        chain_ba.push(recording("b", Arc::clone(&ba))).unwrap();
        chain_ba.push(recording("a", Arc::clone(&ba))).unwrap();

        chain_ab.build(base(Arc::clone(&ab))).call(request()).await;
        chain_ba.build(base(Arc::clone(&ba))).call(request()).await;

        assert_eq!(*ab.lock().unwrap(), ["a:in", "b:in", "base", "b:out", "a:out"]);
        assert_eq!(*ba.lock().unwrap(), ["b:in", "a:in", "base", "a:out", "b:out"]);
    }

    #[tokio::test]
    async fn should_reuse_composed_handler_across_requests() {
        let trace = Trace::default();
        let mut chain = Chain::new();
        chain.push(recording("a", Arc::clone(&trace))).unwrap();
        let handler = chain.build(base(Arc::clone(&trace)));

        handler.call(request()).await;
        handler.call(request()).await;

        assert_eq!(trace.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn should_short_circuit_given_layer_does_not_forward() {
        let trace = Trace::default();
        let deny = |_next: BoxedHandler| -> BoxedHandler {
            boxed(|_req: Request| async { StatusCode::FORBIDDEN })
        };
        let mut chain = Chain::new();
        chain.push(deny).unwrap();

        let res = chain.build(base(Arc::clone(&trace))).call(request()).await;

        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert!(trace.lock().unwrap().is_empty());
    }
}

mod push {
    use super::*;

    #[test]
    fn should_reject_duplicate_named_middleware() {
        let mut chain = Chain::new();
        chain.push(Named("cors")).unwrap();

        let result = chain.push(Named("cors"));

        assert_eq!(result, Err(ConfigError::DuplicateMiddleware("cors")));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn should_accept_distinct_named_middleware() {
        let chain = Chain::new()
            .with(Named("cors"))
            .and_then(|c| c.with(Named("logging")))
            .unwrap();

        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn should_accept_repeated_anonymous_middleware() {
        let trace = Trace::default();
        let mut chain = Chain::new();

        chain.push(recording("a", Arc::clone(&trace))).unwrap();
        chain.push(recording("a", Arc::clone(&trace))).unwrap();

        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
    }
}
