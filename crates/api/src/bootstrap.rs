//! Startup provisioning of the first administrator.

use cursus_core::catalog::CreateUserProfile;
use cursus_core::types::DocId;
use cursus_db::models::credential::CreateCredential;
use cursus_db::repositories::{AdminRepo, CredentialRepo, UserRepo};
use cursus_db::store::DocumentStore;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

const BOOTSTRAP_FULL_NAME: &str = "Administrateur";

/// Make sure the configured account exists and carries the admin marker.
///
/// An existing account keeps its password; only a missing profile or
/// marker is added. Returns the account's uid.
pub async fn ensure_admin(store: &dyn DocumentStore, admin: &BootstrapAdmin) -> AppResult<DocId> {
    let input = CreateUserProfile {
        email: admin.email.clone(),
        password: admin.password.clone(),
        full_name: BOOTSTRAP_FULL_NAME.into(),
        matricule: None,
        year: None,
        speciality: None,
    }
    .normalized()?;

    let uid = match CredentialRepo::find_by_email(store, &input.email).await? {
        Some(credential) => credential.uid,
        None => {
            let uid = uuid::Uuid::new_v4().to_string();
            let password_hash = hash_password(&input.password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
            CredentialRepo::create(
                store,
                &CreateCredential {
                    uid: uid.clone(),
                    email: input.email.clone(),
                    password_hash,
                },
            )
            .await?;
            tracing::info!(uid = %uid, email = %input.email, "Bootstrap admin account created");
            uid
        }
    };

    if UserRepo::find_by_id(store, &uid).await?.is_none() {
        UserRepo::create(store, &uid, &input).await?;
    }
    if AdminRepo::grant(store, &uid, None).await? {
        tracing::info!(uid = %uid, "Bootstrap admin marker granted");
    }
    Ok(uid)
}

#[cfg(test)]
mod tests {
    use cursus_db::store::MemoryDocumentStore;

    use super::*;

    fn admin() -> BootstrapAdmin {
        BootstrapAdmin {
            email: "Admin@Univ.dz".into(),
            password: "motdepasse-admin".into(),
        }
    }

    #[tokio::test]
    async fn creates_account_once() {
        let store = MemoryDocumentStore::new();
        let first = ensure_admin(&store, &admin()).await.unwrap();
        let second = ensure_admin(&store, &admin()).await.unwrap();
        assert_eq!(first, second);

        assert!(AdminRepo::is_admin(&store, &first).await.unwrap());
        let credential = CredentialRepo::find_by_email(&store, "admin@univ.dz")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.uid, first);
        assert_eq!(UserRepo::list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn short_password_is_refused() {
        let store = MemoryDocumentStore::new();
        let bad = BootstrapAdmin {
            email: "admin@univ.dz".into(),
            password: "court".into(),
        };
        assert!(ensure_admin(&store, &bad).await.is_err());
    }
}
