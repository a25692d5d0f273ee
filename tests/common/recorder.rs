#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use metrics::{
    Counter, CounterFn, Gauge, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
    SharedString, Unit,
};

/// One recorded counter increment or histogram sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

/// A recorder that keeps every sample in memory.
#[derive(Clone, Default)]
pub struct Capture {
    samples: Arc<Mutex<Vec<Sample>>>,
    described: Arc<Mutex<Vec<String>>>,
}

impl Capture {
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().unwrap().clone()
    }

    pub fn named(&self, name: &str) -> Vec<Sample> {
        self.samples().into_iter().filter(|s| s.name == name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().unwrap().is_empty()
    }

    /// Metric names passed to `describe_*`, in call order.
    pub fn described(&self) -> Vec<String> {
        self.described.lock().unwrap().clone()
    }
}

struct Handle {
    key: Key,
    samples: Arc<Mutex<Vec<Sample>>>,
}

impl Handle {
    fn push(&self, value: f64) {
        let labels = self
            .key
            .labels()
            .map(|l| (l.key().to_owned(), l.value().to_owned()))
            .collect();
        self.samples.lock().unwrap().push(Sample {
            name: self.key.name().to_owned(),
            labels,
            value,
        });
    }
}

impl CounterFn for Handle {
    fn increment(&self, value: u64) {
        self.push(value as f64);
    }

    fn absolute(&self, value: u64) {
        self.push(value as f64);
    }
}

impl HistogramFn for Handle {
    fn record(&self, value: f64) {
        self.push(value);
    }
}

impl Recorder for Capture {
    fn describe_counter(&self, key: KeyName, _: Option<Unit>, _: SharedString) {
        self.described.lock().unwrap().push(key.as_str().to_owned());
    }

    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn describe_histogram(&self, key: KeyName, _: Option<Unit>, _: SharedString) {
        self.described.lock().unwrap().push(key.as_str().to_owned());
    }

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(Handle { key: key.clone(), samples: Arc::clone(&self.samples) }))
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(Handle { key: key.clone(), samples: Arc::clone(&self.samples) }))
    }
}

pub fn labels(method: &str, status: &str) -> Vec<(String, String)> {
    vec![
        ("method".to_owned(), method.to_owned()),
        ("status".to_owned(), status.to_owned()),
    ]
}
