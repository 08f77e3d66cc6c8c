use reqwest::Client;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) http: Client,
    /// Absolute backend URL RSVPs are relayed to.
    pub(crate) target_url: String,
}
