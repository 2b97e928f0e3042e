use servicearea_core::ServiceAreaComputer;

pub struct AppState {
    pub computer: ServiceAreaComputer,
}
