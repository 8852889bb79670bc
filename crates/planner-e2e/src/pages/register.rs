//! `/register` screen.

use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::E2eResult;
use crate::wait::BasePage;
use tracing::info;

/// Sign-up form
#[derive(Debug, Clone, Copy)]
pub struct RegisterPage<'d> {
    base: BasePage<'d>,
}

impl<'d> RegisterPage<'d> {
    /// Display name input
    pub const NAME_INPUT: Locator = Locator::name("name");
    /// E-mail input
    pub const EMAIL_INPUT: Locator = Locator::name("email");
    /// Password input
    pub const PASSWORD_INPUT: Locator = Locator::name("password");
    /// Password confirmation input
    pub const PASSWORD_CONFIRM_INPUT: Locator = Locator::name("password_confirmation");
    /// Submit button
    pub const REGISTER_BUTTON: Locator = Locator::css("button[type='submit']");
    /// Link back to the sign-in screen
    pub const LOGIN_LINK: Locator = Locator::css("a[href*='login']");
    /// Server-side error banner
    pub const ERROR_MESSAGE: Locator = Locator::css(".alert-error");
    /// Per-field validation messages
    pub const FIELD_ERRORS: Locator = Locator::css(".form-error");
    /// Form heading
    pub const PAGE_TITLE: Locator = Locator::css(".auth-title");

    /// Bind to a session
    #[must_use]
    pub const fn new(base: BasePage<'d>) -> Self {
        Self { base }
    }

    /// Fill in and submit the form. The confirmation defaults to `password`.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirmation: Option<&str>,
    ) -> E2eResult<()> {
        info!(%email, %name, "registering account");
        self.base.type_text(&Self::NAME_INPUT, name).await?;
        self.base.type_text(&Self::EMAIL_INPUT, email).await?;
        self.base.type_text(&Self::PASSWORD_INPUT, password).await?;
        self.base
            .type_text(&Self::PASSWORD_CONFIRM_INPUT, confirmation.unwrap_or(password))
            .await?;
        self.base.click(&Self::REGISTER_BUTTON).await
    }

    /// Follow the link to the sign-in screen
    pub async fn click_login_link(&self) -> E2eResult<()> {
        self.base.click(&Self::LOGIN_LINK).await
    }

    /// Whether the sign-up form is on screen
    pub async fn is_register_page(&self) -> bool {
        if !self.base.is_visible(&Self::PAGE_TITLE).await {
            return false;
        }
        self.base
            .read_text(&Self::PAGE_TITLE)
            .await
            .is_ok_and(|t| t.contains("Sign Up"))
    }

    /// Whether an error banner is shown
    pub async fn is_error_displayed(&self) -> bool {
        self.base.is_visible(&Self::ERROR_MESSAGE).await
    }

    /// Whether any field carries a validation message
    pub async fn has_field_errors(&self) -> bool {
        self.base.is_visible(&Self::FIELD_ERRORS).await
    }

    /// Error banner text, if one is shown
    pub async fn error_message(&self) -> E2eResult<Option<String>> {
        self.base.read_text_if_visible(&Self::ERROR_MESSAGE).await
    }

    /// Every field validation message
    pub async fn field_errors(&self) -> E2eResult<Vec<String>> {
        self.base.read_all_text(&Self::FIELD_ERRORS).await
    }
}

impl<'d> PageObject<'d> for RegisterPage<'d> {
    const URL_PATTERN: &'static str = "/register";

    fn base(&self) -> &BasePage<'d> {
        &self.base
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::test_support::{app, fast, session_at};

    mod register_page_tests {
        use super::*;

        #[tokio::test]
        async fn test_recognises_screen() {
            let app = app();
            let session = session_at(&app, "/register").await;
            let page = RegisterPage::new(BasePage::new(&session, fast()));
            assert!(page.is_register_page().await);
            assert!(!page.has_field_errors().await);
        }

        #[tokio::test]
        async fn test_successful_sign_up_lands_on_login() {
            let app = app();
            let session = session_at(&app, "/register").await;
            let base = BasePage::new(&session, fast());
            RegisterPage::new(base)
                .register("New Person", "new.person@example.com", "password123", None)
                .await
                .unwrap();
            assert!(base.current_location().await.unwrap().ends_with("/login"));
            let known = app
                .inspect(|s| s.user_by_email("new.person@example.com").is_some())
                .unwrap();
            assert!(known);
        }

        #[tokio::test]
        async fn test_mismatch_reports_field_error() {
            let app = app();
            let session = session_at(&app, "/register").await;
            let base = BasePage::new(&session, fast());
            let page = RegisterPage::new(base);
            page.register("A", "a@example.com", "password123", Some("different1"))
                .await
                .unwrap();
            assert!(page.matches_location(&base.current_location().await.unwrap()));
            assert!(page.is_error_displayed().await);
            assert!(page.has_field_errors().await);
            let errors = page.field_errors().await.unwrap();
            assert!(errors.iter().any(|e| e.contains("confirmation does not match")));
        }

        #[tokio::test]
        async fn test_login_link() {
            let app = app();
            let session = session_at(&app, "/register").await;
            let base = BasePage::new(&session, fast());
            RegisterPage::new(base).click_login_link().await.unwrap();
            assert!(base.current_location().await.unwrap().ends_with("/login"));
        }
    }
}
