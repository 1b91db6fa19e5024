use ppecheck_application::InspectionService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub inspection_service: InspectionService,
}
