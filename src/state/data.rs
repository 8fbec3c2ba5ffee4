/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog API and the UI layer. Field names follow the
/// backend's JSON contract through serde renames.

use serde::{Deserialize, Serialize};

/// Represents a single drawing ("draw") in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draw {
    /// Server-assigned identifier, unique within a page
    #[serde(rename = "_id")]
    pub id: String,
    /// Furniture category (free text, e.g. "Chair")
    #[serde(rename = "type")]
    pub kind: String,
    /// Who the drawing was made for
    pub client: ClientInfo,
    /// Encoded image (data URI) or a plain URL
    #[serde(default)]
    pub image: String,
}

/// Client metadata attached to a drawing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub address: String,
}

/// One page of drawings as returned by `GET /draws/{page}`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DrawPage {
    /// Records in server order
    pub docs: Vec<Draw>,
    /// Whether a further page exists
    #[serde(rename = "hasNextPage", default)]
    pub has_next_page: bool,
}

/// Envelope around a page: `{ "draws": { ... } }`
#[derive(Debug, Deserialize)]
pub struct DrawsResponse {
    pub draws: DrawPage,
}

/// Payload for `POST /add`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDraw {
    #[serde(rename = "type")]
    pub kind: String,
    pub client: ClientInfo,
    pub image: String,
}

/// Body returned by the mutation endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
