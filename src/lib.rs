pub mod api;
pub mod audit;
pub mod client;
pub mod config;
pub mod domain;
pub mod engine;
pub mod observability;
pub mod policy;

pub use client::{ClientError, EvaluationClient, RemoteEndpoint};
pub use config::Config;
pub use domain::{AccessRequest, DecisionResult, Policy, Resource, MASKED};
pub use engine::{evaluate, evaluate_many, EvalError};
pub use policy::{PolicyError, PolicyStore};
