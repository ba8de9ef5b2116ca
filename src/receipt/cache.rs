use std::sync::Arc;
use std::time::Duration;

use actix_web::web::Bytes;
use moka::future::Cache;

use super::Receipt;

struct Entry {
    receipt: Receipt,
    pdf: Bytes,
}

/// Rendered receipt documents keyed by invoice id.
///
/// Each entry remembers the receipt it was rendered from, and a lookup only
/// hits when that receipt equals the caller's freshly loaded one. A render
/// that finishes after a billing was added can therefore never be served
/// for the newer state, even if it lands in the cache after the
/// invalidation.
#[derive(Clone)]
pub struct ReceiptCache {
    inner: Cache<u64, Arc<Entry>>,
}

impl ReceiptCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, current: &Receipt) -> Option<Bytes> {
        self.inner
            .get(&current.invoice.id)
            .await
            .filter(|entry| entry.receipt == *current)
            .map(|entry| entry.pdf.clone())
    }

    pub async fn put(&self, receipt: Receipt, pdf: Bytes) {
        let invoice_id = receipt.invoice.id;
        self.inner
            .insert(invoice_id, Arc::new(Entry { receipt, pdf }))
            .await;
    }

    pub async fn invalidate(&self, invoice_id: u64) {
        self.inner.invalidate(&invoice_id).await;
    }
}
