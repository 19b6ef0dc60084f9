/*!
# Network Module

Everything between the client and the wire.

## Components

### Transport
The `Transport` trait performs one lite protocol call. Connection handling,
framing and binary encoding are provided by the implementor.

### Schema
Typed request and response records (`schema`) with the method catalogue
(`LiteMethod`) and constructor ids.

### Retry
An opt-in exponential backoff wrapper (`retry::with_retry`) for callers who
want to retry whole operations. The client itself never retries.
*/

pub mod retry;
pub mod schema;
pub mod transport;

pub use retry::{with_retry, RetryConfig};
pub use schema::{LiteMethod, LiteRequest, LiteResponse};
pub use transport::Transport;
