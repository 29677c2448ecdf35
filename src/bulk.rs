//! Batch validation for bulk create endpoints.
//!
//! Every item is checked with the same rules as a single create before anything
//! is written; the first bad item fails the whole batch. Callers then insert
//! the validated items inside one transaction, so a batch is all-or-nothing.

use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{field_errors, AppError, FieldErrors};

pub const MAX_BATCH: usize = 500;

/// Deserialize and validate `items`, stopping at the first invalid one.
///
/// Field errors are keyed `"{collection}[{index}].{field}"`.
pub fn validate_batch<T>(collection: &str, items: Vec<serde_json::Value>) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Validate,
{
    if items.len() > MAX_BATCH {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_BATCH} {collection} per request"
        )));
    }

    let mut out = Vec::with_capacity(items.len());
    for (index, raw) in items.into_iter().enumerate() {
        let item: T = serde_json::from_value(raw).map_err(|e| {
            let mut fields = FieldErrors::new();
            fields.insert(format!("{collection}[{index}]"), vec![e.to_string()]);
            AppError::Validation(fields)
        })?;
        if let Err(errors) = item.validate() {
            let fields = field_errors(&errors)
                .into_iter()
                .map(|(field, msgs)| (format!("{collection}[{index}].{field}"), msgs))
                .collect();
            return Err(AppError::Validation(fields));
        }
        out.push(item);
    }
    Ok(out)
}
