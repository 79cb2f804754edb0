//! Response resolution
//!
//! Merges declared return members, documented errors and docstring text into
//! one status-code keyed response map.

use crate::docs::Docstring;
use crate::error::RegistrationError;
use crate::http_error::{ErrorRef, ErrorResponse};
use crate::openapi::{MediaType, Response as OpenApiResponse, Schema};
use crate::reply::{CustomResponse, CustomResponseRef};
use crate::response::APPLICATION_JSON;
use crate::types::{ModelRef, StructuredModel};
use ferrule_common::http::HttpStatus;
use std::collections::BTreeMap;

/// One member of a handler's declared return union
#[derive(Debug, Clone)]
pub enum ResponseType {
    Model(ModelRef),
    Error(ErrorRef),
    Custom(CustomResponseRef),
    /// Body passed through untouched, documented only by content type
    Raw { mime_type: String },
    NoContent,
}

impl ResponseType {
    pub fn model<T: StructuredModel>() -> Self {
        Self::Model(ModelRef::of::<T>())
    }

    pub fn error<E: ErrorResponse>() -> Self {
        Self::Error(ErrorRef::of::<E>())
    }

    pub fn custom<C: CustomResponse>() -> Self {
        Self::Custom(CustomResponseRef::of::<C>())
    }

    pub fn raw(mime_type: impl Into<String>) -> Self {
        Self::Raw {
            mime_type: mime_type.into(),
        }
    }

    fn is_success(&self) -> bool {
        !matches!(self, Self::Error(_))
    }
}

/// Responses documented under one status code
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponses {
    pub status: u16,
    pub description: String,
    /// Content types in declaration order
    pub contents: Vec<(String, Option<Schema>)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedResponses {
    /// Sorted by status code
    pub statuses: Vec<StatusResponses>,
    /// A no-content member was declared
    pub body_optional: bool,
}

impl ResolvedResponses {
    pub fn get(&self, status: u16) -> Option<&StatusResponses> {
        self.statuses.iter().find(|entry| entry.status == status)
    }

    pub fn to_openapi(&self) -> BTreeMap<String, OpenApiResponse> {
        self.statuses
            .iter()
            .map(|entry| {
                let content = entry
                    .contents
                    .iter()
                    .map(|(mime, schema)| (mime.clone(), MediaType { schema: schema.clone() }))
                    .collect();
                (
                    entry.status.to_string(),
                    OpenApiResponse {
                        description: entry.description.clone(),
                        content,
                    },
                )
            })
            .collect()
    }
}

struct Entry {
    schema: Option<Schema>,
    description: Option<String>,
}

/// Build the response map for a handler.
///
/// `raises` are appended after the return members and may add status codes.
pub fn resolve(
    returns: &[ResponseType],
    raises: &[ErrorRef],
    docstring: Option<&Docstring>,
    handler: &str,
) -> Result<ResolvedResponses, RegistrationError> {
    if !returns.iter().any(ResponseType::is_success) {
        return Err(RegistrationError::NoSuccessResponse {
            handler: handler.to_string(),
        });
    }

    let describe = |name: Option<&str>| {
        docstring
            .and_then(|doc| doc.return_description(name))
            .map(str::to_string)
    };

    // status -> mime -> entries, each level in first-seen order
    let mut grouped: Vec<(u16, Vec<(String, Vec<Entry>)>)> = Vec::new();
    let mut body_optional = false;

    let mut push = |status: u16, mime: &str, entry: Entry| {
        let position = match grouped.iter().position(|(s, _)| *s == status) {
            Some(position) => position,
            None => {
                grouped.push((status, Vec::new()));
                grouped.len() - 1
            }
        };
        let by_mime = &mut grouped[position].1;
        match by_mime.iter_mut().find(|(m, _)| m == mime) {
            Some((_, entries)) => entries.push(entry),
            None => by_mime.push((mime.to_string(), vec![entry])),
        }
    };

    for member in returns {
        match member {
            ResponseType::Model(model) => push(
                model.config.status_code,
                APPLICATION_JSON,
                Entry {
                    schema: Some(model.schema_ref()),
                    description: describe(Some(model.name)),
                },
            ),
            ResponseType::Error(error) => push(
                error.status_code,
                APPLICATION_JSON,
                Entry {
                    schema: Some(error.schema()),
                    description: describe(Some(error.name)),
                },
            ),
            ResponseType::Custom(custom) => {
                let schema: Schema = serde_json::from_value(custom.raw_schema()).map_err(|e| {
                    RegistrationError::InvalidResponseSchema {
                        response: custom.name.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                push(
                    custom.status_code,
                    custom.mime_type,
                    Entry {
                        schema: Some(schema),
                        description: describe(Some(custom.name)),
                    },
                )
            }
            ResponseType::Raw { mime_type } => push(
                HttpStatus::OK.code(),
                mime_type,
                Entry {
                    schema: None,
                    description: None,
                },
            ),
            ResponseType::NoContent => body_optional = true,
        }
    }

    for error in raises {
        push(
            error.status_code,
            APPLICATION_JSON,
            Entry {
                schema: Some(error.schema()),
                description: describe(Some(error.name)),
            },
        );
    }

    let mut statuses: Vec<StatusResponses> = grouped
        .into_iter()
        .map(|(status, by_mime)| {
            let mut description: Option<String> = None;
            let contents = by_mime
                .into_iter()
                .map(|(mime, entries)| {
                    if description.is_none() {
                        description = entries
                            .iter()
                            .find_map(|entry| entry.description.clone().filter(|d| !d.is_empty()));
                    }
                    (mime, merge_schemas(entries))
                })
                .collect();
            if description.is_none() && HttpStatus(status).is_success() {
                description = describe(None);
            }
            StatusResponses {
                status,
                description: description.unwrap_or_default(),
                contents,
            }
        })
        .collect();
    statuses.sort_by_key(|entry| entry.status);

    Ok(ResolvedResponses {
        statuses,
        body_optional,
    })
}

fn merge_schemas(entries: Vec<Entry>) -> Option<Schema> {
    let mut schemas: Vec<Schema> = entries.into_iter().filter_map(|entry| entry.schema).collect();
    match schemas.len() {
        0 => None,
        1 => schemas.pop(),
        _ => Some(Schema::one_of(schemas)),
    }
}
