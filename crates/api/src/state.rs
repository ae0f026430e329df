use mongodb::Database;
use shopsquad_config::Settings;
use shopsquad_services::{
    AuthService, EmailService, PayPalService,
    dao::{
        catalog::CatalogDao, notification::NotificationDao, party::PartyDao, user::UserDao,
    },
};
use std::sync::Arc;

use crate::ws::storage::WsStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub parties: Arc<PartyDao>,
    pub catalog: Arc<CatalogDao>,
    pub notifications: Arc<NotificationDao>,
    pub paypal: Arc<PayPalService>,
    pub email: Arc<EmailService>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let parties = Arc::new(PartyDao::new(&db));
        let catalog = Arc::new(CatalogDao::new(&db));
        let notifications = Arc::new(NotificationDao::new(&db));
        let paypal = Arc::new(PayPalService::new(&settings.paypal));
        let email = Arc::new(EmailService::new(&settings.email));
        let ws_storage = Arc::new(WsStorage::new());

        Self {
            db,
            settings,
            auth,
            users,
            parties,
            catalog,
            notifications,
            paypal,
            email,
            ws_storage,
        }
    }
}
