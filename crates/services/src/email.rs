use shopsquad_config::EmailSettings;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email API error: {0}")]
    ApiError(String),
}

fn format_currency(amount: f64) -> String {
    format!("{amount:.2} €")
}

/// Transactional mail over the provider's HTTP API. All sends are
/// fire-and-forget from the caller's perspective; a failed send is logged
/// and never fails the mutation that triggered it.
pub struct EmailService {
    settings: EmailSettings,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(settings: &EmailSettings) -> Self {
        Self {
            settings: settings.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn send(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), EmailError> {
        if !self.settings.enabled {
            debug!(%to_email, %subject, "Email disabled, skipping send");
            return Ok(());
        }

        let body = serde_json::json!({
            "from": {
                "email": self.settings.from_address,
                "name": self.settings.from_name,
            },
            "to": [{ "email": to_email, "name": to_name }],
            "subject": subject,
            "html": html,
        });

        let resp = self
            .client
            .post(format!("{}/email", self.settings.api_base))
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::ApiError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EmailError::ApiError(format!("{status}: {text}")));
        }

        info!(%to_email, %subject, "Email sent");
        Ok(())
    }

    /// Sent to every non-organizer participant when payment collection
    /// starts.
    pub async fn send_payment_request(
        &self,
        to_email: &str,
        to_name: &str,
        party_title: &str,
        organizer_name: &str,
        amount: f64,
    ) -> Result<(), EmailError> {
        let subject = format!("Payment requested for {party_title}");
        let html = format!(
            "<h2>Hi {to_name},</h2>\
             <p>{organizer_name} has started collecting payments for \
             <strong>{party_title}</strong>.</p>\
             <p>Your share: <strong>{}</strong></p>\
             <p>Open the squad to settle up via PayPal.</p>",
            format_currency(amount)
        );
        self.send(to_email, to_name, &subject, &html).await
    }

    /// Receipt for the payer.
    pub async fn send_payment_confirmation(
        &self,
        to_email: &str,
        to_name: &str,
        party_title: &str,
        amount: f64,
    ) -> Result<(), EmailError> {
        let subject = format!("Payment confirmed for {party_title}");
        let html = format!(
            "<h2>Thanks {to_name}!</h2>\
             <p>Your payment of <strong>{}</strong> for \
             <strong>{party_title}</strong> went through.</p>",
            format_currency(amount)
        );
        self.send(to_email, to_name, &subject, &html).await
    }

    /// Heads-up to the organizer that a participant has paid.
    pub async fn send_payment_notification(
        &self,
        to_email: &str,
        to_name: &str,
        party_title: &str,
        payer_name: &str,
        amount: f64,
    ) -> Result<(), EmailError> {
        let subject = format!("{payer_name} paid their share for {party_title}");
        let html = format!(
            "<h2>Hi {to_name},</h2>\
             <p><strong>{payer_name}</strong> just paid \
             <strong>{}</strong> for <strong>{party_title}</strong>.</p>",
            format_currency(amount)
        );
        self.send(to_email, to_name, &subject, &html).await
    }

    /// Carries the opaque reset token; the link is the app's reset page.
    pub async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: &str,
        public_url: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let subject = "Reset your ShopSquad password".to_string();
        let html = format!(
            "<h2>Hi {to_name},</h2>\
             <p>Someone asked to reset the password for this account. \
             If that was you, follow the link below. The link expires soon.</p>\
             <p><a href=\"{public_url}/reset-password?token={token}\">Reset password</a></p>\
             <p>If this wasn't you, ignore this email.</p>"
        );
        self.send(to_email, to_name, &subject, &html).await
    }

    /// Sent to every participant when the party reaches completed.
    pub async fn send_party_complete(
        &self,
        to_email: &str,
        to_name: &str,
        party_title: &str,
        total_amount: f64,
    ) -> Result<(), EmailError> {
        let subject = format!("{party_title} is complete!");
        let html = format!(
            "<h2>Hi {to_name},</h2>\
             <p><strong>{party_title}</strong> is all wrapped up. \
             Total collected: <strong>{}</strong>.</p>\
             <p>Thanks for shopping together!</p>",
            format_currency(total_amount)
        );
        self.send(to_email, to_name, &subject, &html).await
    }
}
