use actix_web::{HttpResponse, Responder, web};
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::graphql::schema::AppSchema;

/// Executes a GraphQL request against the shared schema.
pub async fn graphql_handler(schema: web::Data<AppSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

/// Serves the GraphQL Playground, pointed at `/api/v1/graphql`.
pub async fn graphql_playground() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(playground_source(GraphQLPlaygroundConfig::new(
            "/api/v1/graphql",
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::schema::create_schema;
    use crate::validation::dnsmx::MockDnsResolver;
    use crate::validation::{DnsCache, EmailValidator, ValidatorOptions};
    use actix_web::{
        App,
        http::{StatusCode, header::ContentType},
        test::{self, TestRequest, call_service, init_service},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn schema() -> AppSchema {
        create_schema(Arc::new(EmailValidator::new(
            Arc::new(MockDnsResolver::new()),
            Arc::new(DnsCache::default()),
            ValidatorOptions::default(),
        )))
    }

    #[actix_web::test]
    async fn test_graphql_handler() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(schema()))
                .route("/graphql", web::post().to(graphql_handler)),
        )
        .await;

        let req = TestRequest::post()
            .uri("/graphql")
            .insert_header(ContentType::json())
            .set_json(json!({
                "query": "query { validateEmail(email: \"user@example.com\", checkDns: false) { syntaxValid normalized } }"
            }))
            .to_request();

        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["validateEmail"]["syntaxValid"], true);
        assert_eq!(body["data"]["validateEmail"]["normalized"], "user@example.com");

        // GraphQL still returns 200 with errors
        let req = TestRequest::post()
            .uri("/graphql")
            .insert_header(ContentType::json())
            .set_json(json!({ "query": "query { invalid_field }" }))
            .to_request();

        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert!(!body["errors"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_graphql_playground() {
        let app = init_service(
            App::new().route("/playground", web::get().to(graphql_playground)),
        )
        .await;

        let req = TestRequest::get().uri("/playground").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let content_type = resp
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(content_type, "text/html; charset=utf-8");

        let body_bytes = test::read_body(resp).await;
        let body = std::str::from_utf8(&body_bytes).unwrap();
        assert!(body.contains("GraphQL Playground"));
        assert!(body.contains("/api/v1/graphql"));
    }
}
