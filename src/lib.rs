use pyo3::prelude::*;
use pyo3_stub_gen::define_stub_info_gatherer;

use buffer::py_buffer_points;
use model::PyStreetNetwork;
use service_area::PyServiceArea;

pub mod buffer;
pub mod model;
pub mod service_area;

/// A Python module implemented in Rust.
#[pymodule]
fn servicearea(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyStreetNetwork>()?;
    m.add_class::<PyServiceArea>()?;
    m.add_function(wrap_pyfunction!(py_buffer_points, m)?)?;
    Ok(())
}

define_stub_info_gatherer!(stub_info);
