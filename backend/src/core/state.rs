//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, la configurazione e il servizio email
//! condivisi tra route e middleware tramite `Arc<AppState>`.

use crate::core::Config;
use crate::email::EmailSender;
use crate::repositories::{ItemRepository, PoolType, UserRepository};

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per la gestione degli item
    pub item: ItemRepository,

    /// Configurazione caricata all'avvio
    pub config: Config,

    /// Invio email (disabilitato se SMTP non è configurato)
    pub email: EmailSender,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito.
    pub fn new(pool: PoolType, config: Config) -> Self {
        let email = EmailSender::from_config(&config);
        Self {
            user: UserRepository::new(pool.clone()),
            item: ItemRepository::new(pool),
            config,
            email,
        }
    }
}
