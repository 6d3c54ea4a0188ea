use std::sync::Arc;

use crate::auth::{CredentialProvider, OAuthProvider, SessionManager, SignInService};
use crate::config::Settings;
use crate::email::{EmailDispatcher, MailTransport};
use crate::recipient::RecipientService;
use crate::storage::StorageBackend;
use crate::template::TemplateService;
use crate::user::UserService;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn StorageBackend>,
    pub sessions: Arc<SessionManager>,
    pub sign_in: SignInService,
    pub templates: TemplateService,
    pub recipients: RecipientService,
    pub users: UserService,
    pub email: EmailDispatcher,
}

impl AppState {
    /// Wire the services over a storage backend and the two external
    /// collaborators (OAuth provider, mail transport).
    pub fn new(
        settings: Settings,
        store: Arc<dyn StorageBackend>,
        oauth: Arc<dyn OAuthProvider>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        let sessions = Arc::new(SessionManager::new(&settings.session));
        let sign_in = SignInService::new(store.clone(), oauth.clone(), settings.admin.clone());
        let credentials = CredentialProvider::new(store.clone(), oauth);
        let email = EmailDispatcher::new(store.clone(), transport, credentials);

        Self {
            templates: TemplateService::new(store.clone()),
            recipients: RecipientService::new(store.clone()),
            users: UserService::new(store.clone()),
            settings: Arc::new(settings),
            store,
            sessions,
            sign_in,
            email,
        }
    }
}
