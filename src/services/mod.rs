//! Service layer module
//!
//! Contains the HTTP transport, the error-normalizing gateway and the
//! per-resource wrapper functions

pub mod gateway;
pub mod resources;
pub mod transport;

pub use gateway::ApiGateway;
pub use resources::{Operation, Resource, ResourceClient, RouteTable};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
