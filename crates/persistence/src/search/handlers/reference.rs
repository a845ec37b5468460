//! Reference parameter SQL handler.

use tracing::debug;

use crate::types::ReferenceParam;

use super::super::fragment::{SqlFragment, SqlParam};

/// Resolves a chained property (e.g. `name` in `patient.name=Doe`) into a
/// condition on the linked table.
pub type ChainResolver = dyn Fn(&str, &str) -> Option<SqlFragment> + Send + Sync;

/// A reference-valued column and the table it points into.
pub struct ReferenceTarget<'a> {
    /// Column on the searched table holding the linked id.
    pub column: &'a str,
    /// External resource type the column points at.
    pub resource_type: &'a str,
    /// Table holding the linked records.
    pub linked_table: &'a str,
    /// Handles chained properties on the linked table.
    pub chain: &'a ChainResolver,
}

/// Handles reference parameter SQL generation.
pub struct ReferenceHandler;

impl ReferenceHandler {
    /// Builds SQL for one reference value.
    ///
    /// - `Type/id` with a foreign type matches nothing
    /// - `Type/id` or `id` matches the linked id
    /// - a chained value matches records whose linked record satisfies the
    ///   chain condition
    ///
    /// Returns `None` for a chain property the target cannot resolve.
    pub fn build_sql(reference: &ReferenceParam, target: &ReferenceTarget<'_>) -> Option<SqlFragment> {
        if let Some(target_type) = reference.target_type.as_deref() {
            if target_type != target.resource_type {
                debug!(
                    expected = target.resource_type,
                    actual = target_type,
                    "Reference type does not match search target"
                );
                return Some(SqlFragment::never());
            }
        }

        match reference.chain.as_deref() {
            Some(chain) => {
                let condition = (target.chain)(chain, &reference.id_part);
                if condition.is_none() {
                    debug!(chain, resource_type = target.resource_type, "Ignoring unsupported chain");
                }
                let condition = condition?;
                let linked = target.linked_table;
                Some(SqlFragment::with_params(
                    format!(
                        "{} IN (SELECT {linked}.id FROM {linked} WHERE {linked}.voided = 0 AND ({}))",
                        target.column, condition.sql
                    ),
                    condition.params,
                ))
            }
            None => Some(SqlFragment::with_params(
                format!("{} = ?", target.column),
                vec![SqlParam::string(&reference.id_part)],
            )),
        }
    }
}
