use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};

use super::method_not_allowed;
use crate::models::{AppState, SearchParams, SearchResponse};
use crate::types::{AppError, AppResult};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/jstage-search",
        get(search_articles)
            .post(search_articles)
            .fallback(method_not_allowed),
    )
}

/// GET/POST /api/jstage-search?keyword=...&journals=a,b&yearFrom=&yearTo=
async fn search_articles(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Query(params) = query.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let keyword = params
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("keyword parameter is required".to_string()))?;

    let results = state.jstage.search(keyword, &params).await;

    Ok(Json(SearchResponse {
        success: true,
        total: results.len(),
        results,
    }))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{send, state, UNREACHABLE};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_missing_keyword_is_bad_request() {
        for uri in ["/api/jstage-search", "/api/jstage-search?keyword=%20", "/.netlify/functions/jstage-search"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (response, body) = send(state(UNREACHABLE, None), request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"], "keyword parameter is required", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_search_envelope() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/searchapi/do")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cdjournal".to_string(), "jjomh".to_string()),
                Matcher::UrlEncoded("text".to_string(), "復職".to_string()),
                Matcher::UrlEncoded("count".to_string(), "100".to_string()),
                Matcher::UrlEncoded("pubyearto".to_string(), "2024".to_string()),
            ]))
            .with_body(
                "<feed><entry><article_title><ja><![CDATA[復職支援の実際]]></ja></article_title>\
                 <material_title><ja><![CDATA[産業精神保健]]></ja></material_title>\
                 <pubyear>2023</pubyear></entry></feed>",
            )
            .create_async()
            .await;

        let api_url = format!("{}/searchapi/do", server.url());
        let request = Request::builder()
            .uri("/api/jstage-search?keyword=%E5%BE%A9%E8%81%B7&journals=jjomh&yearTo=2024")
            .body(Body::empty())
            .unwrap();
        let (response, body) = send(state(&api_url, None), request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 1);
        assert_eq!(body["results"][0]["title"], "復職支援の実際");
        assert_eq!(body["results"][0]["journal"], "産業精神保健");
        assert_eq!(body["results"][0]["journalCode"], "jjomh");
        assert_eq!(body["results"][0]["year"], "2023");
    }

    #[tokio::test]
    async fn test_failed_journals_yield_empty_results() {
        let request = Request::builder()
            .uri("/api/jstage-search?keyword=test")
            .body(Body::empty())
            .unwrap();
        let (response, body) = send(state(UNREACHABLE, None), request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body["total"], 0);
    }
}
