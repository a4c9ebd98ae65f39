#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use cursus_console::api::{CatalogApi, FileUpload, ImportOutcome, ModuleQuery};
use cursus_console::error::ApiError;
use cursus_core::catalog::{
    AdminUserView, CourseModule, CreateCourseModule, CreateResource, CreateSpecialty,
    CreateUserProfile, CreateYear, Resource, ResourceKind, Specialty, UpdateCourseModule,
    UpdateResource, UpdateSpecialty, UpdateUserProfile, UpdateYear, UserProfile, Year,
};
use cursus_core::import::RejectedItem;
use cursus_core::integrity::{
    DeleteOutcome, MODULE_DEPENDENTS, SPECIALTY_DEPENDENTS, YEAR_DEPENDENTS,
};
use cursus_core::session::SessionUser;
use cursus_core::slug;

/// Catalog contents held by [`FakeApi`].
#[derive(Default)]
pub struct FakeData {
    pub years: Vec<Year>,
    pub specialties: Vec<Specialty>,
    pub modules: Vec<CourseModule>,
    pub resources: Vec<Resource>,
    pub users: Vec<AdminUserView>,
    /// Accounts accepted by `login`, keyed by email, with their password.
    pub accounts: HashMap<String, (String, SessionUser)>,
    pub session: Option<SessionUser>,
    next_id: u64,
}

impl FakeData {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// In-memory [`CatalogApi`] recording calls.
///
/// A call can be held in flight with [`FakeApi::hold`] until the returned
/// sender fires, and made to fail with [`FakeApi::fail`].
#[derive(Default)]
pub struct FakeApi {
    pub data: Mutex<FakeData>,
    calls: Mutex<HashMap<&'static str, usize>>,
    holds: Mutex<HashMap<&'static str, Vec<oneshot::Receiver<()>>>>,
    failures: Mutex<HashMap<&'static str, (u16, String)>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Hold the next call of `operation` until the sender fires or drops.
    pub fn hold(&self, operation: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push(rx);
        tx
    }

    /// Make every call of `operation` answer with `status`.
    pub fn fail(&self, operation: &'static str, status: u16, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (status, message.to_string()));
    }

    pub fn recover(&self, operation: &str) {
        self.failures.lock().unwrap().remove(operation);
    }

    /// Yield until `operation` has been called `count` times.
    pub async fn wait_for(&self, operation: &str, count: usize) {
        while self.calls(operation) < count {
            tokio::task::yield_now().await;
        }
    }

    async fn enter(&self, operation: &'static str) -> Result<(), ApiError> {
        *self.calls.lock().unwrap().entry(operation).or_default() += 1;
        let held = self
            .holds
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(|queue| (!queue.is_empty()).then(|| queue.remove(0)));
        if let Some(rx) = held {
            let _ = rx.await;
        }
        if let Some((status, message)) = self.failures.lock().unwrap().get(operation).cloned() {
            let code = if status == 403 {
                "PERMISSION_DENIED"
            } else {
                "ERROR"
            };
            return Err(ApiError::Status {
                status,
                code: code.into(),
                message,
                field: None,
            });
        }
        Ok(())
    }

    fn data(&self) -> std::sync::MutexGuard<'_, FakeData> {
        self.data.lock().unwrap()
    }

    // ---- seeding ----

    pub fn seed_year(&self, id: &str, name: &str, order: i64) {
        self.data().years.push(Year {
            id: id.into(),
            name: name.into(),
            order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
    }

    pub fn seed_specialty(&self, id: &str, name: &str, year_id: &str) {
        self.data().specialties.push(Specialty {
            id: id.into(),
            name: name.into(),
            year_id: year_id.into(),
            campus: "Campus central".into(),
            icon: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
    }

    pub fn seed_module(&self, id: &str, name: &str, specialty_id: &str, semester_key: &str) {
        let year_id = self
            .data()
            .specialties
            .iter()
            .find(|s| s.id == specialty_id)
            .map(|s| s.year_id.clone())
            .unwrap_or_default();
        self.data().modules.push(CourseModule {
            id: id.into(),
            name: name.into(),
            specialty_id: specialty_id.into(),
            year_id,
            semester_key: semester_key.into(),
            module_code: None,
            coefficient: 1.0,
            credits: 2.0,
            evaluations: Default::default(),
            eliminatory_mark: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
    }

    pub fn seed_resource(&self, id: &str, module_id: &str, title: &str, url: &str) {
        self.data().resources.push(Resource {
            id: id.into(),
            module_id: module_id.into(),
            kind: ResourceKind::Course,
            title: title.into(),
            url: url.into(),
            source: None,
            is_recommended: false,
            is_exclusive: false,
            storage_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
    }

    pub fn seed_user(&self, uid: &str, email: &str, full_name: &str, is_admin: bool) {
        self.data().users.push(AdminUserView {
            profile: UserProfile {
                uid: uid.into(),
                email: email.into(),
                full_name: full_name.into(),
                matricule: None,
                year: None,
                speciality: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            is_admin,
        });
    }

    pub fn seed_account(&self, email: &str, password: &str, is_admin: bool) {
        let user = SessionUser {
            uid: format!("uid-{email}"),
            email: email.into(),
            full_name: "Compte de test".into(),
            is_admin,
        };
        self.data()
            .accounts
            .insert(email.into(), (password.into(), user));
    }

    /// Open a session for a seeded account without going through `login`.
    pub fn login_directly(&self, email: &str) {
        let mut data = self.data();
        data.session = data.accounts.get(email).map(|(_, user)| user.clone());
    }

    pub fn signed_in(&self) -> Option<SessionUser> {
        self.data().session.clone()
    }
}

fn missing(what: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        code: "NOT_FOUND".into(),
        message: format!("{what} introuvable."),
        field: None,
    }
}

#[async_trait]
impl CatalogApi for FakeApi {
    async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ApiError> {
        self.enter("login").await?;
        let account = self.data().accounts.get(email).cloned();
        match account {
            Some((expected, user)) if expected == password => {
                self.data().session = Some(user.clone());
                Ok(user)
            }
            _ => Err(ApiError::Status {
                status: 401,
                code: "UNAUTHORIZED".into(),
                message: "Email ou mot de passe incorrect.".into(),
                field: None,
            }),
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.enter("logout").await?;
        self.data().session = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<SessionUser>, ApiError> {
        self.enter("current_user").await?;
        Ok(self.data().session.clone())
    }

    async fn list_years(&self) -> Result<Vec<Year>, ApiError> {
        self.enter("list_years").await?;
        let mut years = self.data().years.clone();
        years.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(years)
    }

    async fn create_year(&self, input: &CreateYear) -> Result<Year, ApiError> {
        self.enter("create_year").await?;
        let mut data = self.data();
        let year = Year {
            id: data.next_id("year"),
            name: input.name.clone(),
            order: input.order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        data.years.push(year.clone());
        Ok(year)
    }

    async fn update_year(&self, id: &str, input: &UpdateYear) -> Result<Year, ApiError> {
        self.enter("update_year").await?;
        let mut data = self.data();
        let year = data
            .years
            .iter_mut()
            .find(|y| y.id == id)
            .ok_or_else(|| missing("Année"))?;
        if let Some(name) = &input.name {
            year.name = name.clone();
        }
        if let Some(order) = input.order {
            year.order = order;
        }
        Ok(year.clone())
    }

    async fn delete_year(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        self.enter("delete_year").await?;
        let mut data = self.data();
        let count = data.specialties.iter().filter(|s| s.year_id == id).count();
        let outcome = YEAR_DEPENDENTS.evaluate(count as u64);
        if outcome.success {
            data.years.retain(|y| y.id != id);
        }
        Ok(outcome)
    }

    async fn list_specialties(&self, year_id: Option<&str>) -> Result<Vec<Specialty>, ApiError> {
        self.enter("list_specialties").await?;
        let mut rows: Vec<Specialty> = self
            .data()
            .specialties
            .iter()
            .filter(|s| year_id.map_or(true, |y| s.year_id == y))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn create_specialty(&self, input: &CreateSpecialty) -> Result<Specialty, ApiError> {
        self.enter("create_specialty").await?;
        let id = slug::specialty_id(&input.name).map_err(|e| ApiError::Decode(e.to_string()))?;
        let specialty = Specialty {
            id,
            name: input.name.clone(),
            year_id: input.year_id.clone(),
            campus: input.campus.clone(),
            icon: input.icon.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.data().specialties.push(specialty.clone());
        Ok(specialty)
    }

    async fn update_specialty(
        &self,
        id: &str,
        input: &UpdateSpecialty,
    ) -> Result<Specialty, ApiError> {
        self.enter("update_specialty").await?;
        let mut data = self.data();
        let specialty = data
            .specialties
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| missing("Spécialité"))?;
        if let Some(name) = &input.name {
            specialty.name = name.clone();
        }
        if let Some(campus) = &input.campus {
            specialty.campus = campus.clone();
        }
        if let Some(icon) = &input.icon {
            specialty.icon = (!icon.is_empty()).then(|| icon.clone());
        }
        Ok(specialty.clone())
    }

    async fn delete_specialty(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        self.enter("delete_specialty").await?;
        let mut data = self.data();
        let count = data.modules.iter().filter(|m| m.specialty_id == id).count();
        let outcome = SPECIALTY_DEPENDENTS.evaluate(count as u64);
        if outcome.success {
            data.specialties.retain(|s| s.id != id);
        }
        Ok(outcome)
    }

    async fn list_modules(&self, query: &ModuleQuery) -> Result<Vec<CourseModule>, ApiError> {
        self.enter("list_modules").await?;
        let rows = self
            .data()
            .modules
            .iter()
            .filter(|m| {
                query.specialty_id.as_ref().map_or(true, |s| &m.specialty_id == s)
                    && query.semester_key.as_ref().map_or(true, |k| &m.semester_key == k)
                    && query.year_id.as_ref().map_or(true, |y| &m.year_id == y)
            })
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn create_module(&self, input: &CreateCourseModule) -> Result<CourseModule, ApiError> {
        self.enter("create_module").await?;
        let id = slug::module_id(&input.specialty_id, &input.semester_key, &input.name)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let module = CourseModule {
            id,
            name: input.name.clone(),
            specialty_id: input.specialty_id.clone(),
            year_id: input.year_id.clone(),
            semester_key: input.semester_key.clone(),
            module_code: input.module_code.clone(),
            coefficient: input.coefficient,
            credits: input.credits,
            evaluations: input.evaluations.clone(),
            eliminatory_mark: input.eliminatory_mark,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.data().modules.push(module.clone());
        Ok(module)
    }

    async fn update_module(
        &self,
        id: &str,
        input: &UpdateCourseModule,
    ) -> Result<CourseModule, ApiError> {
        self.enter("update_module").await?;
        let mut data = self.data();
        let module = data
            .modules
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| missing("Module"))?;
        if let Some(name) = &input.name {
            module.name = name.clone();
        }
        if let Some(coefficient) = input.coefficient {
            module.coefficient = coefficient;
        }
        if let Some(credits) = input.credits {
            module.credits = credits;
        }
        if let Some(mark) = input.eliminatory_mark {
            module.eliminatory_mark = mark;
        }
        Ok(module.clone())
    }

    async fn delete_module(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        self.enter("delete_module").await?;
        let mut data = self.data();
        let count = data.resources.iter().filter(|r| r.module_id == id).count();
        let outcome = MODULE_DEPENDENTS.evaluate(count as u64);
        if outcome.success {
            data.modules.retain(|m| m.id != id);
        }
        Ok(outcome)
    }

    async fn list_resources(&self, module_id: Option<&str>) -> Result<Vec<Resource>, ApiError> {
        self.enter("list_resources").await?;
        let rows = self
            .data()
            .resources
            .iter()
            .filter(|r| module_id.map_or(true, |m| r.module_id == m))
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn create_resource(&self, input: &CreateResource) -> Result<Resource, ApiError> {
        self.enter("create_resource").await?;
        let mut data = self.data();
        let resource = Resource {
            id: data.next_id("res"),
            module_id: input.module_id.clone(),
            kind: input.kind,
            title: input.title.clone(),
            url: input.url.clone().unwrap_or_default(),
            source: input.source.clone(),
            is_recommended: input.is_recommended,
            is_exclusive: input.is_exclusive,
            storage_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        data.resources.push(resource.clone());
        Ok(resource)
    }

    async fn update_resource(
        &self,
        id: &str,
        input: &UpdateResource,
    ) -> Result<Resource, ApiError> {
        self.enter("update_resource").await?;
        let mut data = self.data();
        let resource = data
            .resources
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| missing("Ressource"))?;
        if let Some(title) = &input.title {
            resource.title = title.clone();
        }
        if let Some(url) = &input.url {
            resource.url = url.clone();
        }
        if let Some(source) = &input.source {
            resource.source = (!source.is_empty()).then(|| source.clone());
        }
        Ok(resource.clone())
    }

    async fn delete_resource(&self, id: &str) -> Result<DeleteOutcome, ApiError> {
        self.enter("delete_resource").await?;
        self.data().resources.retain(|r| r.id != id);
        Ok(DeleteOutcome::deleted())
    }

    async fn upload_resource_file(
        &self,
        id: &str,
        file: &FileUpload,
    ) -> Result<Resource, ApiError> {
        self.enter("upload_resource_file").await?;
        let mut data = self.data();
        let resource = data
            .resources
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| missing("Ressource"))?;
        let path = format!("resources/{id}/{}", file.file_name);
        resource.url = format!("http://localhost:3000/files/{path}");
        resource.storage_path = Some(path);
        Ok(resource.clone())
    }

    /// One resource per line holding an http(s) link; other lines are rejected.
    async fn import_resources(
        &self,
        module_id: &str,
        text: &str,
    ) -> Result<ImportOutcome, ApiError> {
        self.enter("import_resources").await?;
        let mut data = self.data();
        let mut outcome = ImportOutcome {
            created: Vec::new(),
            rejected: Vec::new(),
        };
        for (index, line) in text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let Some((title, url)) = line.split_once(" http") else {
                outcome.rejected.push(RejectedItem {
                    index,
                    reason: "Lien manquant.".into(),
                });
                continue;
            };
            let resource = Resource {
                id: data.next_id("res"),
                module_id: module_id.into(),
                kind: ResourceKind::Link,
                title: title.trim().into(),
                url: format!("http{url}"),
                source: None,
                is_recommended: false,
                is_exclusive: false,
                storage_path: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            data.resources.push(resource.clone());
            outcome.created.push(resource);
        }
        Ok(outcome)
    }

    async fn list_users(&self) -> Result<Vec<AdminUserView>, ApiError> {
        self.enter("list_users").await?;
        Ok(self.data().users.clone())
    }

    async fn create_user(&self, input: &CreateUserProfile) -> Result<AdminUserView, ApiError> {
        self.enter("create_user").await?;
        let mut data = self.data();
        let uid = data.next_id("uid");
        let view = AdminUserView {
            profile: UserProfile {
                uid,
                email: input.email.clone(),
                full_name: input.full_name.clone(),
                matricule: input.matricule.clone(),
                year: input.year.clone(),
                speciality: input.speciality.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            is_admin: false,
        };
        data.users.push(view.clone());
        Ok(view)
    }

    async fn update_user(
        &self,
        uid: &str,
        input: &UpdateUserProfile,
    ) -> Result<AdminUserView, ApiError> {
        self.enter("update_user").await?;
        let mut data = self.data();
        let user = data
            .users
            .iter_mut()
            .find(|u| u.profile.uid == uid)
            .ok_or_else(|| missing("Utilisateur"))?;
        if let Some(email) = &input.email {
            user.profile.email = email.clone();
        }
        if let Some(full_name) = &input.full_name {
            user.profile.full_name = full_name.clone();
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, uid: &str) -> Result<DeleteOutcome, ApiError> {
        self.enter("delete_user").await?;
        self.data().users.retain(|u| u.profile.uid != uid);
        Ok(DeleteOutcome::deleted())
    }

    async fn toggle_admin(&self, uid: &str) -> Result<AdminUserView, ApiError> {
        self.enter("toggle_admin").await?;
        let mut data = self.data();
        let user = data
            .users
            .iter_mut()
            .find(|u| u.profile.uid == uid)
            .ok_or_else(|| missing("Utilisateur"))?;
        user.is_admin = !user.is_admin;
        Ok(user.clone())
    }
}
