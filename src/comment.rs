//! The final projected output of a parsed documentation comment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::wiki::Body;

/// Everything extracted from a single `/** ... */` comment: its parsed
/// body, a one-line summary, and every recognized tag projected into a
/// named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub body: Body,
    /// A flattened prefix-of-body inline used as a one-line digest.
    /// Empty (`Text("")`) when the comment's opening text isn't a plain
    /// sentence.
    pub short: crate::wiki::Inline,

    pub authors: Vec<Body>,
    pub see: Vec<Body>,
    pub todo: Vec<Body>,
    pub note: Vec<Body>,
    pub example: Vec<Body>,

    pub result: Option<Body>,
    pub version: Option<Body>,
    pub since: Option<Body>,
    pub deprecated: Option<Body>,

    /// Symbol name -> parsed tag value, for `@throws`/`@param`/`@tparam`.
    pub throws: BTreeMap<String, Body>,
    pub value_params: BTreeMap<String, Body>,
    pub type_params: BTreeMap<String, Body>,
}
