//! Scripted stand-ins for the external services. Built for unit tests and,
//! with the `test-support` feature, for integration tests.

use crate::ai::{AiError, LanguageModel};
use crate::geocoding::{GeocodeError, GeocodeHit, Geocoder};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Language model that replays canned completions in order and records prompts.
/// Once the script runs out every call fails with a service error.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, AiError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<String, AiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Err(AiError::Service("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Geocoder that replays canned answers in order and records every address
/// it was asked about. Once the script runs out every call is a transient failure.
pub struct ScriptedGeocoder {
    responses: Mutex<VecDeque<Result<Vec<GeocodeHit>, GeocodeError>>>,
    addresses: Mutex<Vec<String>>,
}

impl ScriptedGeocoder {
    pub fn new(responses: Vec<Result<Vec<GeocodeHit>, GeocodeError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            addresses: Mutex::new(Vec::new()),
        }
    }

    /// Geocoder that must never be called; any call is a transient failure
    pub fn unused() -> Self {
        Self::new(Vec::new())
    }

    /// Always answers with the same point
    pub fn fixed(latitude: f64, longitude: f64, calls: usize) -> Self {
        Self::new(
            (0..calls)
                .map(|_| {
                    Ok(vec![GeocodeHit {
                        latitude: Some(latitude),
                        longitude: Some(longitude),
                        display_name: None,
                    }])
                })
                .collect(),
        )
    }

    pub fn addresses(&self) -> Vec<String> {
        self.addresses.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.addresses().len()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>, GeocodeError> {
        if let Ok(mut addresses) = self.addresses.lock() {
            addresses.push(address.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| Err(GeocodeError::Transient("script exhausted".into())))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
