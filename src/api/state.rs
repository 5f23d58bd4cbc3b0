use crate::service::tufe::TufeService;

/**
* Represents the application state shared across the Actix web application.
*/
pub struct AppState {
    /**
     * The service for handling TUFE record operations.
     */
    pub tufe_service: TufeService,
}

/**
 * Creates a new instance of `AppState`.
 *
 * # Arguments
 * `tufe_service`: The service for handling TUFE record operations.
 */
impl AppState {
    pub fn new(tufe_service: TufeService) -> Self {
        AppState { tufe_service }
    }
}
