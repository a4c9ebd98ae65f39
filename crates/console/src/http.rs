//! [`CatalogApi`] over HTTP with [`reqwest`].
//!
//! Entity endpoints answer `{"data": ...}`; deletes and the auth endpoints
//! answer bare JSON. Errors come back as `{"error", "code", "field"?}`.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use cursus_core::catalog::{
    AdminUserView, CourseModule, CreateCourseModule, CreateResource, CreateSpecialty,
    CreateUserProfile, CreateYear, Resource, Specialty, UpdateCourseModule, UpdateResource,
    UpdateSpecialty, UpdateUserProfile, UpdateYear, Year,
};
use cursus_core::integrity::DeleteOutcome;
use cursus_core::session::SessionUser;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::{CatalogApi, FileUpload, ImportOutcome, ModuleQuery};
use crate::config::ConsoleConfig;
use crate::error::ApiError;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: String,
    #[serde(default)]
    field: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    user: SessionUser,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ImportBody<'a> {
    text: &'a str,
}

#[derive(Default, Serialize)]
struct ListFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    year_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    module_id: Option<&'a str>,
}

/// HTTP client for the catalog API, holding the bearer token of the
/// current session.
pub struct HttpCatalogApi {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpCatalogApi {
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, decoding the API's
    /// error body on failure.
    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".into());
        Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => ApiError::Status {
                status: status.as_u16(),
                code: body.code,
                message: body.error,
                field: body.field,
            },
            Err(_) => ApiError::Status {
                status: status.as_u16(),
                code: String::new(),
                message: text,
                field: None,
            },
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = Self::ensure_success(response).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn data<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        Self::json::<Envelope<T>>(response).await.map(|e| e.data)
    }

    async fn get_data<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        let response = self
            .authorized(self.client.get(self.url(path)).query(query))
            .send()
            .await?;
        Self::data(response).await
    }

    async fn post_data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .authorized(self.client.post(self.url(path)).json(body))
            .send()
            .await?;
        Self::data(response).await
    }

    async fn put_data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .authorized(self.client.put(self.url(path)).json(body))
            .send()
            .await?;
        Self::data(response).await
    }

    async fn delete(&self, path: &str) -> Result<DeleteOutcome, ApiError> {
        let response = self
            .authorized(self.client.delete(self.url(path)))
            .send()
            .await?;
        Self::json(response).await
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginBody { email, password })
            .send()
            .await?;
        let login: LoginResponse = Self::json(response).await?;
        self.set_token(Some(login.access_token));
        Ok(login.user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        if !self.has_token() {
            return Ok(());
        }
        let response = self
            .authorized(self.client.post(self.url("/auth/logout")))
            .send()
            .await;
        self.set_token(None);
        Self::ensure_success(response?).await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<SessionUser>, ApiError> {
        if !self.has_token() {
            return Ok(None);
        }
        let response = self
            .authorized(self.client.get(self.url("/auth/me")))
            .send()
            .await?;
        match Self::json(response).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_unauthorized() => {
                self.set_token(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_years(&self) -> Result<Vec<Year>, ApiError> {
        self.get_data("/years", &ListFilter::default()).await
    }

    async fn create_year(&self, input: &CreateYear) -> Result<Year, ApiError> {
        self.post_data("/years", input).await
    }

    async fn update_year(&self, id: &str, input: &UpdateYear) -> Result<Year, ApiError> {
        self.put_data(&format!("/years/{id}"), input).await
    }

    async fn delete_year(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        self.delete(&format!("/years/{id}")).await
    }

    async fn list_specialties(&self, year_id: Option<&str>) -> Result<Vec<Specialty>, ApiError> {
        let filter = ListFilter {
            year_id,
            module_id: None,
        };
        self.get_data("/specialties", &filter).await
    }

    async fn create_specialty(&self, input: &CreateSpecialty) -> Result<Specialty, ApiError> {
        self.post_data("/specialties", input).await
    }

    async fn update_specialty(
        &self,
        id: &str,
        input: &UpdateSpecialty,
    ) -> Result<Specialty, ApiError> {
        self.put_data(&format!("/specialties/{id}"), input).await
    }

    async fn delete_specialty(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        self.delete(&format!("/specialties/{id}")).await
    }

    async fn list_modules(&self, query: &ModuleQuery) -> Result<Vec<CourseModule>, ApiError> {
        self.get_data("/modules", query).await
    }

    async fn create_module(&self, input: &CreateCourseModule) -> Result<CourseModule, ApiError> {
        self.post_data("/modules", input).await
    }

    async fn update_module(
        &self,
        id: &str,
        input: &UpdateCourseModule,
    ) -> Result<CourseModule, ApiError> {
        self.put_data(&format!("/modules/{id}"), input).await
    }

    async fn delete_module(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        self.delete(&format!("/modules/{id}")).await
    }

    async fn list_resources(&self, module_id: Option<&str>) -> Result<Vec<Resource>, ApiError> {
        let filter = ListFilter {
            year_id: None,
            module_id,
        };
        self.get_data("/resources", &filter).await
    }

    async fn create_resource(&self, input: &CreateResource) -> Result<Resource, ApiError> {
        self.post_data("/resources", input).await
    }

    async fn update_resource(
        &self,
        id: &str,
        input: &UpdateResource,
    ) -> Result<Resource, ApiError> {
        self.put_data(&format!("/resources/{id}"), input).await
    }

    async fn delete_resource(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        self.delete(&format!("/resources/{id}")).await
    }

    async fn upload_resource_file(
        &self,
        id: &str,
        file: &FileUpload,
    ) -> Result<Resource, ApiError> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let form = Form::new().part("file", part);
        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("/resources/{id}/file")))
                    .multipart(form),
            )
            .send()
            .await?;
        Self::data(response).await
    }

    async fn import_resources(
        &self,
        module_id: &str,
        text: &str,
    ) -> Result<ImportOutcome, ApiError> {
        self.post_data(
            &format!("/modules/{module_id}/resources/import"),
            &ImportBody { text },
        )
        .await
    }

    async fn list_users(&self) -> Result<Vec<AdminUserView>, ApiError> {
        self.get_data("/users", &ListFilter::default()).await
    }

    async fn create_user(&self, input: &CreateUserProfile) -> Result<AdminUserView, ApiError> {
        self.post_data("/users", input).await
    }

    async fn update_user(
        &self,
        uid: &str,
        input: &UpdateUserProfile,
    ) -> Result<AdminUserView, ApiError> {
        self.put_data(&format!("/users/{uid}"), input).await
    }

    async fn delete_user(&self, uid: &str) -> Result<DeleteOutcome, ApiError> {
        self.delete(&format!("/users/{uid}")).await
    }

    async fn toggle_admin(&self, uid: &str) -> Result<AdminUserView, ApiError> {
        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("/users/{uid}/admin/toggle"))),
            )
            .send()
            .await?;
        Self::data(response).await
    }
}
