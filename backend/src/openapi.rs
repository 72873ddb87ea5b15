//! OpenAPI - documento unico con tutte le route e gli schemi, servito su
//! `/api/v1/openapi.json` e usato per generare il client.

use crate::dtos::{
    CreateItemDTO, CreateUserDTO, ItemDTO, ItemsPageDTO, LoginForm, MessageDTO, NewPasswordDTO,
    PrivateCreateUserDTO, RegisterUserDTO, TokenDTO, UpdateItemDTO, UpdateMeDTO,
    UpdatePasswordDTO, UpdateUserDTO, UserDTO, UsersPageDTO,
};
use crate::services::{auth, item, private, user, utils};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(title = "FastAPI Project", description = "Users and items REST API"),
    paths(
        auth::login_user,
        auth::test_token,
        auth::recover_password,
        auth::reset_password,
        auth::recover_password_html_content,
        user::list_users,
        user::create_user,
        user::get_me,
        user::update_me,
        user::update_my_password,
        user::delete_my_account,
        user::register_user,
        user::get_user_by_id,
        user::update_user,
        user::delete_user,
        item::list_items,
        item::get_item,
        item::create_item,
        item::update_item,
        item::delete_item,
        utils::test_email,
        utils::health_check,
        private::create_private_user
    ),
    components(schemas(
        UserDTO,
        UsersPageDTO,
        CreateUserDTO,
        RegisterUserDTO,
        UpdateUserDTO,
        UpdateMeDTO,
        UpdatePasswordDTO,
        ItemDTO,
        ItemsPageDTO,
        CreateItemDTO,
        UpdateItemDTO,
        LoginForm,
        TokenDTO,
        NewPasswordDTO,
        MessageDTO,
        PrivateCreateUserDTO
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "login", description = "Access tokens and password recovery"),
        (name = "users", description = "User management"),
        (name = "items", description = "Items owned by users"),
        (name = "utils", description = "Health check and test email"),
        (name = "private", description = "Local development only")
    )
)]
pub struct ApiDoc;

/// Schema "bearer" referenziato da `security(("bearer" = []))` negli handler
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/login/access-token"));
        assert!(paths.contains_key("/api/v1/users/{user_id}"));
        assert!(paths.contains_key("/api/v1/items/{id}"));
        assert!(paths.contains_key("/api/v1/utils/health-check"));
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
