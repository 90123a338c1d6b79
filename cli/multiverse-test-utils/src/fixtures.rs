use serde_json::{Value, json};

/// Base URL of the public catalog, used for reference URLs in fixtures.
pub const API: &str = "https://rickandmortyapi.com/api";

const CREATED: &str = "2017-11-04T18:48:46.250Z";

/// Reference URLs `{base}/{resource}/{id}` for every id in `ids`.
pub fn reference_urls(
    base: &str,
    resource: &str,
    ids: impl IntoIterator<Item = u32>,
) -> Vec<String> {
    ids.into_iter()
        .map(|id| format!("{base}/{resource}/{id}"))
        .collect()
}

/// A character appearing in episodes `1..=n_episodes`.
pub fn character_json(id: u32, name: &str, status: &str, n_episodes: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": status,
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": {
            "name": "Earth (C-137)",
            "url": format!("{API}/location/1"),
        },
        "location": {
            "name": "Citadel of Ricks",
            "url": format!("{API}/location/3"),
        },
        "image": format!("{API}/character/avatar/{id}.jpeg"),
        "episode": reference_urls(API, "episode", 1..=n_episodes),
        "url": format!("{API}/character/{id}"),
        "created": CREATED,
    })
}

/// An episode featuring characters `1..=n_characters`.
pub fn episode_json(id: u32, name: &str, code: &str, n_characters: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "air_date": "December 2, 2013",
        "episode": code,
        "characters": reference_urls(API, "character", 1..=n_characters),
        "url": format!("{API}/episode/{id}"),
        "created": CREATED,
    })
}

/// A location with residents `1..=n_residents`.
pub fn location_json(id: u32, name: &str, n_residents: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": "Planet",
        "dimension": "Dimension C-137",
        "residents": reference_urls(API, "character", 1..=n_residents),
        "url": format!("{API}/location/{id}"),
        "created": CREATED,
    })
}

/// Replace the reference list `field` of an entity fixture.
pub fn with_references(mut entity: Value, field: &str, urls: Vec<String>) -> Value {
    entity[field] = json!(urls);
    entity
}

/// Page envelope for page `page` of `pages` containing `results`.
pub fn page_json(resource: &str, page: u32, count: u64, pages: u32, results: Vec<Value>) -> Value {
    let link = |page: u32| format!("{API}/{resource}?page={page}");
    let next = (page < pages).then(|| link(page + 1));
    let prev = (page > 1).then(|| link(page - 1));
    json!({
        "info": {
            "count": count,
            "pages": pages,
            "next": next,
            "prev": prev,
        },
        "results": results,
    })
}
