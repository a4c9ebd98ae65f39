//! Dialog drafts.
//!
//! Forms hold exactly what the user typed. `validate` turns a draft into a
//! typed, normalized input or a field-scoped [`ConsoleError::Invalid`],
//! without touching the network.

use std::collections::BTreeSet;

use cursus_core::catalog::{
    AdminUserView, CourseModule, CreateCourseModule, CreateResource, CreateSpecialty,
    CreateUserProfile, CreateYear, Evaluation, Resource, ResourceKind, Specialty,
    UpdateCourseModule, UpdateResource, UpdateSpecialty, UpdateUserProfile, UpdateYear, Year,
};
use cursus_core::validation::{parse_integer, parse_number, parse_optional_number};

use crate::api::FileUpload;
use crate::error::{ConsoleError, ConsoleResult};

fn format_number(value: f64) -> String {
    value.to_string()
}

// ---------------------------------------------------------------------------
// Years
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearForm {
    pub name: String,
    pub order: String,
}

impl YearForm {
    pub fn from_year(year: &Year) -> Self {
        Self {
            name: year.name.clone(),
            order: year.order.to_string(),
        }
    }

    pub fn validate(&self) -> ConsoleResult<CreateYear> {
        let input = CreateYear {
            name: self.name.clone(),
            order: parse_integer("order", &self.order)?,
        };
        Ok(input.normalized()?)
    }

    pub fn validate_update(&self) -> ConsoleResult<UpdateYear> {
        let input = self.validate()?;
        Ok(UpdateYear {
            name: Some(input.name),
            order: Some(input.order),
        })
    }
}

// ---------------------------------------------------------------------------
// Specialties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialtyForm {
    pub name: String,
    pub year_id: String,
    pub campus: String,
    pub icon: String,
}

impl SpecialtyForm {
    pub fn from_specialty(specialty: &Specialty) -> Self {
        Self {
            name: specialty.name.clone(),
            year_id: specialty.year_id.clone(),
            campus: specialty.campus.clone(),
            icon: specialty.icon.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> ConsoleResult<CreateSpecialty> {
        let input = CreateSpecialty {
            name: self.name.clone(),
            year_id: self.year_id.clone(),
            campus: self.campus.clone(),
            icon: Some(self.icon.clone()),
        };
        Ok(input.normalized()?)
    }

    /// A blank icon clears the stored one.
    pub fn validate_update(&self) -> ConsoleResult<UpdateSpecialty> {
        let input = self.validate()?;
        Ok(UpdateSpecialty {
            name: Some(input.name),
            year_id: Some(input.year_id),
            campus: Some(input.campus),
            icon: Some(input.icon.unwrap_or_default()),
        })
    }
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleForm {
    pub name: String,
    pub specialty_id: String,
    pub year_id: String,
    pub semester_key: String,
    pub module_code: String,
    pub coefficient: String,
    pub credits: String,
    pub evaluations: BTreeSet<Evaluation>,
    pub eliminatory_mark: String,
}

impl ModuleForm {
    pub fn from_module(module: &CourseModule) -> Self {
        Self {
            name: module.name.clone(),
            specialty_id: module.specialty_id.clone(),
            year_id: module.year_id.clone(),
            semester_key: module.semester_key.clone(),
            module_code: module.module_code.clone().unwrap_or_default(),
            coefficient: format_number(module.coefficient),
            credits: format_number(module.credits),
            evaluations: module.evaluations.clone(),
            eliminatory_mark: module
                .eliminatory_mark
                .map(format_number)
                .unwrap_or_default(),
        }
    }

    pub fn toggle_evaluation(&mut self, evaluation: Evaluation) {
        if !self.evaluations.remove(&evaluation) {
            self.evaluations.insert(evaluation);
        }
    }

    pub fn validate(&self) -> ConsoleResult<CreateCourseModule> {
        let input = CreateCourseModule {
            name: self.name.clone(),
            specialty_id: self.specialty_id.clone(),
            year_id: self.year_id.clone(),
            semester_key: self.semester_key.clone(),
            module_code: Some(self.module_code.clone()),
            coefficient: parse_number("coefficient", &self.coefficient)?,
            credits: parse_number("credits", &self.credits)?,
            evaluations: self.evaluations.clone(),
            eliminatory_mark: parse_optional_number("eliminatory_mark", &self.eliminatory_mark)?,
        };
        Ok(input.normalized()?)
    }

    /// Blank code and mark clear the stored values.
    pub fn validate_update(&self) -> ConsoleResult<UpdateCourseModule> {
        let input = self.validate()?;
        Ok(UpdateCourseModule {
            name: Some(input.name),
            module_code: Some(input.module_code.unwrap_or_default()),
            coefficient: Some(input.coefficient),
            credits: Some(input.credits),
            evaluations: Some(input.evaluations),
            eliminatory_mark: Some(input.eliminatory_mark),
        })
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceForm {
    pub module_id: String,
    pub kind: ResourceKind,
    pub title: String,
    pub url: String,
    pub source: String,
    pub is_recommended: bool,
    pub is_exclusive: bool,
    /// File picked for upload, sent after the resource is saved.
    pub file: Option<FileUpload>,
}

impl Default for ResourceForm {
    fn default() -> Self {
        Self {
            module_id: String::new(),
            kind: ResourceKind::Course,
            title: String::new(),
            url: String::new(),
            source: String::new(),
            is_recommended: false,
            is_exclusive: false,
            file: None,
        }
    }
}

/// A validated resource draft and the file to upload with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSubmission<T> {
    pub input: T,
    pub file: Option<FileUpload>,
}

impl ResourceForm {
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            module_id: resource.module_id.clone(),
            kind: resource.kind,
            title: resource.title.clone(),
            url: resource.url.clone(),
            source: resource.source.clone().unwrap_or_default(),
            is_recommended: resource.is_recommended,
            is_exclusive: resource.is_exclusive,
            file: None,
        }
    }

    fn require_content(&self) -> ConsoleResult<()> {
        let has_file = self.file.as_ref().is_some_and(|f| !f.bytes.is_empty());
        if !has_file && self.url.trim().is_empty() {
            return Err(ConsoleError::invalid(
                "url",
                "Ajoutez un fichier ou renseignez un lien.",
            ));
        }
        Ok(())
    }

    pub fn validate(&self) -> ConsoleResult<ResourceSubmission<CreateResource>> {
        self.require_content()?;
        let input = CreateResource {
            module_id: self.module_id.clone(),
            kind: self.kind,
            title: self.title.clone(),
            url: Some(self.url.clone()),
            source: Some(self.source.clone()),
            is_recommended: self.is_recommended,
            is_exclusive: self.is_exclusive,
        }
        .normalized()?;
        Ok(ResourceSubmission {
            input,
            file: self.file.clone(),
        })
    }

    /// A blank source clears the stored one; a blank URL keeps the stored
    /// one and relies on the file upload.
    pub fn validate_update(&self) -> ConsoleResult<ResourceSubmission<UpdateResource>> {
        let create = self.validate()?;
        Ok(ResourceSubmission {
            input: UpdateResource {
                kind: Some(create.input.kind),
                title: Some(create.input.title),
                url: create.input.url,
                source: Some(create.input.source.unwrap_or_default()),
                is_recommended: Some(create.input.is_recommended),
                is_exclusive: Some(create.input.is_exclusive),
            },
            file: create.file,
        })
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// New account: login credentials plus profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub matricule: String,
    pub year: String,
    pub speciality: String,
}

impl UserForm {
    pub fn validate(&self) -> ConsoleResult<CreateUserProfile> {
        let input = CreateUserProfile {
            email: self.email.clone(),
            password: self.password.clone(),
            full_name: self.full_name.clone(),
            matricule: Some(self.matricule.clone()),
            year: Some(self.year.clone()),
            speciality: Some(self.speciality.clone()),
        };
        Ok(input.normalized()?)
    }
}

/// Profile edit of an existing account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub email: String,
    pub full_name: String,
    pub matricule: String,
    pub year: String,
    pub speciality: String,
}

impl ProfileForm {
    pub fn from_user(user: &AdminUserView) -> Self {
        let profile = &user.profile;
        Self {
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            matricule: profile.matricule.clone().unwrap_or_default(),
            year: profile.year.clone().unwrap_or_default(),
            speciality: profile.speciality.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> ConsoleResult<UpdateUserProfile> {
        let input = UpdateUserProfile {
            email: Some(self.email.clone()),
            full_name: Some(self.full_name.clone()),
            matricule: Some(self.matricule.clone()),
            year: Some(self.year.clone()),
            speciality: Some(self.speciality.clone()),
        };
        Ok(input.normalized()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_form() -> ModuleForm {
        ModuleForm {
            name: "Algèbre".into(),
            specialty_id: "spec-x".into(),
            year_id: "y1".into(),
            semester_key: "Semestre 2".into(),
            coefficient: "2".into(),
            credits: "4,5".into(),
            ..Default::default()
        }
    }

    #[test]
    fn negative_coefficient_is_rejected() {
        let mut form = module_form();
        form.coefficient = "-1".into();
        assert_eq!(form.validate().unwrap_err().field(), Some("coefficient"));
    }

    #[test]
    fn decimal_comma_is_accepted() {
        let input = module_form().validate().unwrap();
        assert_eq!(input.credits, 4.5);
        assert_eq!(input.module_code, None);
        assert_eq!(input.eliminatory_mark, None);
    }

    #[test]
    fn mark_above_twenty_is_rejected() {
        let mut form = module_form();
        form.eliminatory_mark = "21".into();
        assert_eq!(form.validate().unwrap_err().field(), Some("eliminatory_mark"));
    }

    #[test]
    fn module_update_clears_blank_code_and_mark() {
        let update = module_form().validate_update().unwrap();
        assert_eq!(update.module_code.as_deref(), Some(""));
        assert_eq!(update.eliminatory_mark, Some(None));
    }

    #[test]
    fn toggling_evaluations() {
        let mut form = module_form();
        form.toggle_evaluation(Evaluation::Td);
        form.toggle_evaluation(Evaluation::Examen);
        form.toggle_evaluation(Evaluation::Td);
        assert_eq!(form.evaluations, BTreeSet::from([Evaluation::Examen]));
    }

    #[test]
    fn year_order_must_be_whole() {
        let form = YearForm {
            name: "L1".into(),
            order: "1.5".into(),
        };
        assert_eq!(form.validate().unwrap_err().field(), Some("order"));
    }

    #[test]
    fn resource_without_file_or_url_is_rejected() {
        let form = ResourceForm {
            module_id: "m".into(),
            title: "Cours".into(),
            url: "   ".into(),
            ..Default::default()
        };
        assert_eq!(form.validate_update().unwrap_err().field(), Some("url"));
        assert_eq!(form.validate().unwrap_err().field(), Some("url"));
    }

    #[test]
    fn resource_with_file_needs_no_url() {
        let form = ResourceForm {
            module_id: "m".into(),
            title: "Cours".into(),
            file: Some(FileUpload {
                file_name: "cours.pdf".into(),
                bytes: b"%PDF".to_vec(),
            }),
            ..Default::default()
        };
        let submission = form.validate().unwrap();
        assert_eq!(submission.input.url, None);
        assert!(submission.file.is_some());
    }

    #[test]
    fn user_form_checks_password_length() {
        let form = UserForm {
            email: "a@univ.dz".into(),
            password: "court".into(),
            full_name: "A".into(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap_err().field(), Some("password"));
    }
}
