use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{base_asset, AssetParams, AssetTable};

/// Read-through cache from pair to its resolved parameter record
///
/// Constructed once per run by the caller. Each pair is resolved on first
/// lookup and never rewritten, so every later lookup returns the same `Arc`.
#[derive(Debug)]
pub struct ParamCache {
    table: Arc<AssetTable>,
    resolved: RwLock<HashMap<String, Arc<AssetParams>>>,
}

impl ParamCache {
    pub fn new(table: AssetTable) -> Self {
        Self::shared(Arc::new(table))
    }

    pub fn shared(table: Arc<AssetTable>) -> Self {
        Self {
            table,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    pub fn table(&self) -> &AssetTable {
        &self.table
    }

    /// Parameters for a pair such as "DOGE/USDT"
    ///
    /// Unknown base assets resolve to the table's default record.
    pub fn get(&self, pair: &str) -> Arc<AssetParams> {
        {
            let resolved = self.resolved.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(params) = resolved.get(pair) {
                return params.clone();
            }
        }

        let mut resolved = self.resolved.write().unwrap_or_else(PoisonError::into_inner);
        resolved
            .entry(pair.to_string())
            .or_insert_with(|| self.resolve(pair))
            .clone()
    }

    /// Number of pairs resolved so far
    pub fn len(&self) -> usize {
        self.resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn resolve(&self, pair: &str) -> Arc<AssetParams> {
        let symbol = base_asset(pair);
        match self.table.get(&symbol) {
            Some(params) => {
                tracing::info!(pair, symbol = %symbol, "Resolved asset parameters");
                params.clone()
            }
            None => {
                tracing::warn!(
                    pair,
                    symbol = %symbol,
                    "No tuned parameters for asset, using default record"
                );
                self.table.default_params().clone()
            }
        }
    }
}

impl Default for ParamCache {
    fn default() -> Self {
        Self::new(AssetTable::builtin())
    }
}
