/*!
# Network Transport Module

The transport seam of the lite query client. Framing, connection management and
binary encoding of the schema records are the transport's business; the client
only hands it a typed request and a time budget.

## Contract

1. **One call, one response**
   ```rust,ignore
   #[async_trait]
   pub trait Transport: Send + Sync {
       async fn query(&self, request: LiteRequest, timeout: Duration) -> Result<LiteResponse>;
   }
   ```
   - The request variant names the remote procedure (`LiteRequest::method`)
   - The response is fully decoded; remote error envelopes arrive as `LiteResponse::Error`
   - Connection faults are reported as `LiteError::Transport`

2. **Time budget**
   - The timeout is advisory for the transport
   - The query layer enforces it independently with `tokio::time::timeout`

## Integration

The transport is shared by every query issued from one client instance, so
implementations must tolerate concurrent calls.
*/

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::network::schema::{LiteRequest, LiteResponse};
use crate::Result;

/// Transport layer for lite protocol calls
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single remote call
    async fn query(&self, request: LiteRequest, timeout: Duration) -> Result<LiteResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn query(&self, request: LiteRequest, timeout: Duration) -> Result<LiteResponse> {
        (**self).query(request, timeout).await
    }
}
