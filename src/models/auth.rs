use serde::Serialize;

/// Form posted to the sign-in endpoint.
#[derive(Serialize)]
pub struct SignInForm<'a> {
    /// The member's username.
    pub username: &'a str,

    /// The member's password.
    pub password: &'a str,
}
