use std::{borrow::BorrowMut, future::Future};

use axum::{response::Response, http::Request, body::Body};
use http_body::{combinators::UnsyncBoxBody, Body as _};
use sea_orm::{prelude::*, ActiveValue, DatabaseConnection};
use team_service_server::state::AppState;
use tower::Service;


pub struct Fixture {
    pub app: axum::Router,
    pub db: DatabaseConnection,
}

pub struct APIResponse {
    response: Response<UnsyncBoxBody<axum::body::Bytes, axum::Error>>,
}

impl APIResponse {
    pub fn status(&self) -> axum::http::StatusCode {
        self.response.status()
    }

    pub async fn json<T: serde::de::DeserializeOwned>(&mut self) -> T {
        let mut buf = Vec::new();

        let body = self.response.body_mut();

        while let Some(next) = body.data().await {
            buf.extend_from_slice(&next.unwrap());
        }
        serde_json::from_slice(&buf).unwrap()
    }
}

impl From<Response<UnsyncBoxBody<axum::body::Bytes, axum::Error>>> for APIResponse {
    fn from(response: Response<UnsyncBoxBody<hyper::body::Bytes, axum::Error>>) -> Self {
        Self {
            response,
        }
    }
}

impl Fixture {
    /// A fresh in-memory app with two tournaments (uuids 1 and 2) and five
    /// profiles (uuids 100–104, emails `player<n>@example.com`).
    pub async fn new() -> Self {
        Self::new_with_setup(|_| async {}).await
    }

    pub async fn new_with_setup<F, Fut>(setup_func: F) -> Self
    where
        F: FnOnce(DatabaseConnection) -> Fut,
        Fut: Future<Output = ()>,
    {
        let state = AppState::new_test_app().await;
        let db = state.db.clone();
        seed_base_data(&db).await;
        setup_func(db.clone()).await;
        let app = team_service_server::app_with_state(state).await;

        Self { app, db }
    }

    #[allow(dead_code)]
    pub async fn get(&mut self, path: &str) -> APIResponse {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.app.borrow_mut()
            .call(request)
            .await
            .unwrap().into()
    }

    #[allow(dead_code)]
    pub async fn post_json<T>(&mut self, path: &str, body: T) -> APIResponse where T: serde::Serialize
    {
        self.send_json("POST", path, body).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T>(&mut self, path: &str, body: T) -> APIResponse where T: serde::Serialize
    {
        self.send_json("PATCH", path, body).await
    }

    #[allow(dead_code)]
    pub async fn delete(&mut self, path: &str) -> APIResponse {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.app.borrow_mut()
            .call(request)
            .await
            .unwrap().into()
    }

    /// A minimal single-field multipart upload.
    #[allow(dead_code)]
    pub async fn post_file(&mut self, path: &str, content_type: &str, bytes: &[u8]) -> APIResponse {
        let boundary = "fixture-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"roster.xlsx\"\r\nContent-Type: {}\r\n\r\n",
                boundary, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();
        self.app.borrow_mut()
            .call(request)
            .await
            .unwrap().into()
    }

    #[allow(dead_code)]
    async fn send_json<T>(&mut self, method: &str, path: &str, body: T) -> APIResponse where T: serde::Serialize
    {
        let request = Request::builder()
            .method(method)
            .header("Content-Type", "application/json")
            .uri(path)
            .body(
                Body::from(
                    serde_json::to_string(&body).unwrap()
                )
            )
            .unwrap();
        self.app.borrow_mut()
            .call(request)
            .await
            .unwrap().into()
    }
}

async fn seed_base_data(db: &DatabaseConnection) {
    team_service_entities::schema::tournament::Entity::insert_many(vec![
        team_service_entities::schema::tournament::ActiveModel {
            uuid: ActiveValue::Set(Uuid::from_u128(1)),
            name: ActiveValue::Set("Spring Open".into()),
            status: ActiveValue::Set("open".into()),
            start_date: ActiveValue::Set(None),
        },
        team_service_entities::schema::tournament::ActiveModel {
            uuid: ActiveValue::Set(Uuid::from_u128(2)),
            name: ActiveValue::Set("Autumn Open".into()),
            status: ActiveValue::Set("open".into()),
            start_date: ActiveValue::Set(None),
        },
    ]).exec(db).await.unwrap();

    let now = chrono::Utc::now().naive_utc();
    let profiles = (100u128..=104)
        .map(|n| team_service_entities::schema::profile::ActiveModel {
            uuid: ActiveValue::Set(Uuid::from_u128(n)),
            email: ActiveValue::Set(format!("player{}@example.com", n)),
            display_name: ActiveValue::Set(format!("Player {}", n)),
            first_name: ActiveValue::Set(Some("Player".into())),
            last_name: ActiveValue::Set(Some(format!("{}", n))),
            created_at: ActiveValue::Set(now),
        })
        .collect::<Vec<_>>();
    team_service_entities::schema::profile::Entity::insert_many(profiles).exec(db).await.unwrap();
}
