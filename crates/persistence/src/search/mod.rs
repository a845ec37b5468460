//! Search-predicate engine.
//!
//! A [`SearchParameterMap`](crate::types::SearchParameterMap) is resolved by a
//! [`CriteriaBuilder`] into a [`ResolvedQuery`]: a SQL filter over one table,
//! ordered by id, plus the include relationships to follow for each result
//! page. The builder owns the algorithm; [`SearchHooks`] implementations
//! ([`EnrollmentSearch`], [`PersonSearch`]) say what each kind means for
//! their record type, reusing the shared [`handlers`].

mod criteria;
mod enrollment;
pub mod fragment;
pub mod handlers;
mod person;
pub mod relationships;

pub use criteria::{CriteriaBuilder, ResolvedQuery, SearchHooks};
pub use enrollment::EnrollmentSearch;
pub use fragment::{SqlFragment, SqlParam};
pub use person::PersonSearch;
pub use relationships::{IncludeType, Relationship, ResolvedInclude};
