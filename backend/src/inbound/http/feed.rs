//! Public tracker feed listing every stored thing.
//!
//! ```text
//! GET /tracker
//! ```

use actix_web::{HttpRequest, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, Thing};
use crate::inbound::http::ApiResult;
use crate::inbound::http::links::{absolute, thing_path};
use crate::inbound::http::state::HttpState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedAuthor {
    #[schema(example = "alice")]
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedEntry {
    #[schema(example = "11111111-1111-1111-1111-111111111111")]
    pub id: String,
    pub url: String,
    pub title: String,
    pub authors: Vec<FeedAuthor>,
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Feed {
    pub things: Vec<FeedEntry>,
}

fn entry(req: &HttpRequest, thing: &Thing) -> ApiResult<FeedEntry> {
    Ok(FeedEntry {
        id: thing.id().to_string(),
        url: absolute(req, &thing_path(thing.id()))?.into(),
        title: thing.title().to_owned(),
        authors: vec![FeedAuthor {
            name: thing.owner().to_string(),
        }],
        description: thing.description().to_owned(),
    })
}

/// Every thing with its absolute URL and author.
#[utoipa::path(
    get,
    path = "/tracker",
    responses(
        (status = 200, description = "Tracker feed", body = Feed),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["things"],
    operation_id = "trackerFeed",
    security([])
)]
#[get("/tracker")]
pub async fn tracker(req: HttpRequest, state: web::Data<HttpState>) -> ApiResult<web::Json<Feed>> {
    let things = state.things_query.list().await?;
    let things = things
        .iter()
        .map(|thing| entry(&req, thing))
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(web::Json(Feed { things }))
}
