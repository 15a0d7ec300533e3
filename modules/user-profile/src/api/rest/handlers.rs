use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Form, Path};
use axum::http::HeaderMap;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use tracing::info;
use uuid::Uuid;

use crate::domain::service::Service;
use crate::domain::session::RequestSession;
use crate::infra::session_store::SessionStore;

use super::dto::{EditProfileView, UpdateProfileRequest, UserDto};
use super::error::{ApiResult, domain_error_to_problem};

/// Session id from the request cookies, if a well-formed one is present.
fn session_id(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

fn session_cookie(cookie_name: &str, id: Uuid) -> String {
    format!("{cookie_name}={id}; Path=/; HttpOnly; SameSite=Lax")
}

pub async fn show_user(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserDto>> {
    let user = svc
        .get_user(id)
        .await
        .map_err(|e| domain_error_to_problem(&e, &format!("/users/{id}")))?;
    Ok(Json(user.into()))
}

/// Renders the edit page state and consumes what the last submission left.
pub async fn edit_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> ApiResult<Json<EditProfileView>> {
    let user = svc
        .get_user(id)
        .await
        .map_err(|e| domain_error_to_problem(&e, &format!("/users/{id}/edit")))?;

    let mut session = session_id(&headers, sessions.cookie_name())
        .map(|sid| sessions.take(sid))
        .unwrap_or_default();
    let (flashes, saved) = (session.take_flashes(), session.take_validation());
    let (errors, old_input) =
        saved.map_or((None, BTreeMap::new()), |v| (Some(v.report), v.old_input));

    Ok(Json(EditProfileView {
        user: user.into(),
        flashes,
        errors,
        old_input,
    }))
}

/// Handles the profile form post.
///
/// Redirects to the profile on success and back to the edit page otherwise;
/// either way the session cookie is (re)issued so the next page can show the
/// stored messages.
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Form(req): Form<UpdateProfileRequest>,
) -> ApiResult<Response> {
    let sid = session_id(&headers, sessions.cookie_name()).unwrap_or_else(Uuid::new_v4);
    let mut session = RequestSession::default();

    let form = req.into_form(id);
    let result = svc.update_profile(&mut session, &form).await;
    sessions.save(sid, session);

    let (_, outcome) =
        result.map_err(|e| domain_error_to_problem(&e, &format!("/users/{id}")))?;
    info!(user_id = id, ?outcome, "Profile form handled");

    let location = if outcome.is_success() {
        format!("/users/{id}")
    } else {
        format!("/users/{id}/edit")
    };
    let cookie = session_cookie(sessions.cookie_name(), sid);

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(&location)).into_response())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::form::{NAME_MESSAGES, UPDATE_FAILED_PREFIX};
    use crate::domain::model::{NewUser, User};
    use crate::domain::repo::UsersRepository;
    use crate::domain::session::FlashLevel;
    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, LOCATION};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Mutex;
    use time::OffsetDateTime;
    use tower::ServiceExt as _;

    struct MockRepository {
        users: Mutex<Vec<User>>,
        fail_updates: bool,
    }

    #[async_trait]
    impl UsersRepository for MockRepository {
        async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> anyhow::Result<bool> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .any(|u| u.name == name && Some(u.id) != exclude_id))
        }

        async fn update(&self, user: &User) -> anyhow::Result<()> {
            if self.fail_updates {
                anyhow::bail!("db timeout");
            }
            let mut users = self.users.lock().unwrap();
            if let Some(slot) = users.iter_mut().find(|u| u.id == user.id) {
                *slot = user.clone();
            }
            Ok(())
        }

        async fn create(&self, _new_user: NewUser) -> anyhow::Result<User> {
            anyhow::bail!("not supported")
        }
    }

    fn create_test_router(fail_updates: bool) -> Router {
        let at = OffsetDateTime::UNIX_EPOCH;
        let repo = Arc::new(MockRepository {
            users: Mutex::new(vec![User {
                id: 1,
                name: "alice".to_owned(),
                email: "alice@example.com".to_owned(),
                introduction: String::new(),
                created_at: at,
                updated_at: at,
            }]),
            fail_updates,
        });
        let service = Arc::new(Service::new(repo));
        let sessions = Arc::new(SessionStore::new(
            "bbs_session",
            std::time::Duration::from_secs(60),
        ));
        crate::api::rest::router(service, sessions)
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn cookie_pair(response: &Response) -> String {
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_owned()
    }

    #[test]
    fn test_session_id_parsing() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, format!("theme=dark; bbs_session={id}").parse().unwrap());

        assert_eq!(session_id(&headers, "bbs_session"), Some(id));
        assert_eq!(session_id(&headers, "other"), None);

        headers.insert(COOKIE, "bbs_session=not-a-uuid".parse().unwrap());
        assert_eq!(session_id(&headers, "bbs_session"), None);
    }

    #[tokio::test]
    async fn test_valid_post_redirects_to_profile() {
        let app = create_test_router(false);

        let response = app
            .clone()
            .oneshot(post_form(
                "/users/1",
                "name=valid_user1&email=a%40example.com&introduction=",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/users/1");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["name"], "valid_user1");
        assert_eq!(json["email"], "a@example.com");
    }

    #[tokio::test]
    async fn test_invalid_post_shows_errors_once() {
        let app = create_test_router(false);

        let response = app
            .clone()
            .oneshot(post_form("/users/1", "name=ab&email=a%40example.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/users/1/edit");
        let cookie = cookie_pair(&response);

        let response = app
            .clone()
            .oneshot(get_with_cookie("/users/1/edit", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["user"]["name"], "alice");
        assert_eq!(json["errors"]["errors"][0], NAME_MESSAGES[1]);
        assert_eq!(json["old_input"]["name"], "ab");

        let response = app
            .oneshot(get_with_cookie("/users/1/edit", &cookie))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert!(json.get("errors").is_none());
        assert_eq!(json["flashes"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_flashes_danger() {
        let app = create_test_router(true);

        let response = app
            .clone()
            .oneshot(post_form("/users/1", "name=valid_user1&email=a%40example.com"))
            .await
            .unwrap();
        assert_eq!(response.headers()[LOCATION], "/users/1/edit");
        let cookie = cookie_pair(&response);

        let response = app
            .oneshot(get_with_cookie("/users/1/edit", &cookie))
            .await
            .unwrap();
        let json = json_body(response).await;
        let flash = &json["flashes"][0];
        assert_eq!(
            flash["level"],
            serde_json::to_value(FlashLevel::Danger).unwrap()
        );
        assert_eq!(
            flash["message"],
            format!("{UPDATE_FAILED_PREFIX}db timeout")
        );
        assert_eq!(json["user"]["name"], "alice");
    }

    #[tokio::test]
    async fn test_unknown_user_is_problem_404() {
        let app = create_test_router(false);

        let response = app
            .oneshot(post_form("/users/404", "name=whoever&email=a%40example.com"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            super::super::error::APPLICATION_PROBLEM_JSON
        );
        let json = json_body(response).await;
        assert_eq!(json["status"], 404);
        assert_eq!(json["instance"], "/users/404");
    }
}
