//! Navigation targets returned by the auth flows

use std::fmt;

/// Page the caller should navigate to after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Login,
    Profile,
    ForgotPassword,
    ResetPassword,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::Login => "/login",
            Route::Profile => "/profile",
            Route::ForgotPassword => "/forgot-password",
            Route::ResetPassword => "/reset-password",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
