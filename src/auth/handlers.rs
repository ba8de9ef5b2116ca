use crate::{
    auth::{jwt::generate_access_token, password::{verify_dummy, verify_password}},
    config::Config,
    error::{AppError, AppResult},
    model::role::Role,
    models::{LoginReqDto, LoginResponse},
    repository::BillingStore,
};
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{debug, info, instrument};

fn invalid_credentials(role: Role) -> AppError {
    AppError::InvalidCredentials(format!("Invalid username or password for {role}"))
}

#[instrument(
    name = "auth_login",
    skip(store, config, user, role),
    fields(username = %user.username, role = %role)
)]
async fn login_as(
    role: Role,
    user: LoginReqDto,
    store: &dyn BillingStore,
    config: &Config,
) -> AppResult<HttpResponse> {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::Validation("Username and password are required".into()));
    }

    // 2️⃣ Fetch account; every failure below pays for one argon2 verify
    let account = match store.find_user(user.username.trim()).await? {
        Some(account) => account,
        None => {
            let _ = verify_dummy(&user.password);
            info!("Invalid credentials: user not found");
            return Err(invalid_credentials(role));
        }
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&user.password, &account.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(invalid_credentials(role));
    }

    // an Admin cannot enter through the Super Admin door and vice versa
    if account.role != role {
        info!(account_role = %account.role, "Invalid credentials: role mismatch");
        return Err(invalid_credentials(role));
    }

    debug!(user_id = account.id, "Password verified, issuing access token");

    // 4️⃣ Generate access token
    let access_token = generate_access_token(
        account.id,
        account.username.clone(),
        account.role,
        &config.jwt_secret,
        config.access_token_ttl,
    )?;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl,
        redirect: role.dashboard_path().to_string(),
    }))
}

fn login_page(role: Role) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "role": role,
        "login": role.login_path(),
        "fields": ["username", "password"],
    }))
}

#[utoipa::path(
    get,
    path = "/admin_login",
    responses((status = 200, description = "Admin login entry point")),
    tag = "Auth"
)]
pub async fn admin_login_page() -> HttpResponse {
    login_page(Role::Admin)
}

#[utoipa::path(
    post,
    path = "/admin_login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid username or password for Admin")
    ),
    tag = "Auth"
)]
pub async fn admin_login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn BillingStore>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    login_as(Role::Admin, user.into_inner(), store.get_ref(), &config).await
}

#[utoipa::path(
    get,
    path = "/super_admin_login",
    responses((status = 200, description = "Super Admin login entry point")),
    tag = "Auth"
)]
pub async fn super_admin_login_page() -> HttpResponse {
    login_page(Role::SuperAdmin)
}

#[utoipa::path(
    post,
    path = "/super_admin_login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid username or password for Super Admin")
    ),
    tag = "Auth"
)]
pub async fn super_admin_login(
    user: web::Json<LoginReqDto>,
    store: web::Data<dyn BillingStore>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    login_as(Role::SuperAdmin, user.into_inner(), store.get_ref(), &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::accounts::create_account, config, repository::MemoryStore};

    fn creds(username: &str, password: &str) -> LoginReqDto {
        LoginReqDto {
            username: username.into(),
            password: password.into(),
        }
    }

    #[actix_web::test]
    async fn every_failure_reads_the_same() {
        let store = MemoryStore::new();
        let config = config::tests::config();
        create_account(&store, "owner", "owner-password", Role::SuperAdmin)
            .await
            .unwrap();

        let attempts = [
            creds("nobody", "owner-password"),
            creds("owner", "wrong-password"),
            creds("owner", "owner-password"),
        ];
        for attempt in attempts {
            let err = login_as(Role::Admin, attempt, &store, &config).await.unwrap_err();
            assert_eq!(err.to_string(), "Invalid username or password for Admin");
        }

        let ok = login_as(
            Role::SuperAdmin,
            creds("owner", "owner-password"),
            &store,
            &config,
        )
        .await
        .unwrap();
        assert_eq!(ok.status(), actix_web::http::StatusCode::OK);
    }
}
