//! `/login` screen.

use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::E2eResult;
use crate::wait::BasePage;
use tracing::info;

/// Sign-in form
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'d> {
    base: BasePage<'d>,
}

impl<'d> LoginPage<'d> {
    /// E-mail input
    pub const EMAIL_INPUT: Locator = Locator::name("email");
    /// Password input
    pub const PASSWORD_INPUT: Locator = Locator::name("password");
    /// Submit button
    pub const LOGIN_BUTTON: Locator = Locator::css("button[type='submit']");
    /// Link to the registration screen
    pub const REGISTER_LINK: Locator = Locator::css("a[href*='register']");
    /// Server-side error banner
    pub const ERROR_MESSAGE: Locator = Locator::css(".alert-error");
    /// Success banner (after sign-up)
    pub const SUCCESS_MESSAGE: Locator = Locator::css(".alert-success");
    /// Form heading
    pub const PAGE_TITLE: Locator = Locator::css(".auth-title");
    /// Brand block above the form
    pub const BRAND: Locator = Locator::css(".auth-brand");

    /// Bind to a session
    #[must_use]
    pub const fn new(base: BasePage<'d>) -> Self {
        Self { base }
    }

    /// Type the e-mail address
    pub async fn enter_email(&self, email: &str) -> E2eResult<()> {
        self.base.type_text(&Self::EMAIL_INPUT, email).await
    }

    /// Type the password
    pub async fn enter_password(&self, password: &str) -> E2eResult<()> {
        self.base.type_text(&Self::PASSWORD_INPUT, password).await
    }

    /// Press the submit button
    pub async fn click_login(&self) -> E2eResult<()> {
        self.base.click(&Self::LOGIN_BUTTON).await
    }

    /// Fill in and submit the form
    pub async fn login(&self, email: &str, password: &str) -> E2eResult<()> {
        info!(%email, "logging in");
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.click_login().await
    }

    /// Follow the link to the registration screen
    pub async fn click_register_link(&self) -> E2eResult<()> {
        self.base.click(&Self::REGISTER_LINK).await
    }

    /// Error banner text, if one is shown
    pub async fn error_message(&self) -> E2eResult<Option<String>> {
        self.base.read_text_if_visible(&Self::ERROR_MESSAGE).await
    }

    /// Success banner text, if one is shown
    pub async fn success_message(&self) -> E2eResult<Option<String>> {
        self.base.read_text_if_visible(&Self::SUCCESS_MESSAGE).await
    }

    /// Whether an error banner is shown
    pub async fn is_error_displayed(&self) -> bool {
        self.base.is_visible(&Self::ERROR_MESSAGE).await
    }

    /// Whether the brand block is shown
    pub async fn is_brand_visible(&self) -> bool {
        self.base.is_visible(&Self::BRAND).await
    }

    /// Whether the sign-in form is on screen
    pub async fn is_login_page(&self) -> bool {
        if !self.base.is_visible(&Self::PAGE_TITLE).await {
            return false;
        }
        self.base
            .read_text(&Self::PAGE_TITLE)
            .await
            .is_ok_and(|t| t.contains("Sign In"))
    }
}

impl<'d> PageObject<'d> for LoginPage<'d> {
    const URL_PATTERN: &'static str = "/login";

    fn base(&self) -> &BasePage<'d> {
        &self.base
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::test_support::{app, fast, session_at};
    use crate::sim::routes::MSG_BAD_CREDENTIALS;

    mod login_page_tests {
        use super::*;

        #[tokio::test]
        async fn test_recognises_screen() {
            let app = app();
            let session = session_at(&app, "/login").await;
            let page = LoginPage::new(BasePage::new(&session, fast()));
            assert!(page.is_login_page().await);
            assert!(page.is_brand_visible().await);
            assert!(!page.is_error_displayed().await);
            assert_eq!(page.page_name(), "LoginPage");
        }

        #[tokio::test]
        async fn test_good_credentials_leave_screen() {
            let app = app();
            let session = session_at(&app, "/login").await;
            let base = BasePage::new(&session, fast());
            let page = LoginPage::new(base);
            page.login("user@eventplanner.com", "user123").await.unwrap();
            let url = base.current_location().await.unwrap();
            assert!(url.ends_with("/home"), "{url}");
            assert!(!page.matches_location(&url));
        }

        #[tokio::test]
        async fn test_bad_credentials_show_error() {
            let app = app();
            let session = session_at(&app, "/login").await;
            let base = BasePage::new(&session, fast());
            let page = LoginPage::new(base);
            page.login("user@eventplanner.com", "nope").await.unwrap();
            assert!(page.matches_location(&base.current_location().await.unwrap()));
            assert!(page.is_error_displayed().await);
            let message = page.error_message().await.unwrap().unwrap();
            assert!(message.contains(MSG_BAD_CREDENTIALS), "{message}");
            assert_eq!(page.success_message().await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_register_link() {
            let app = app();
            let session = session_at(&app, "/login").await;
            let base = BasePage::new(&session, fast());
            LoginPage::new(base).click_register_link().await.unwrap();
            assert!(base.current_location().await.unwrap().ends_with("/register"));
        }
    }
}
