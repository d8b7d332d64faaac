use mzdata::spectrum::MultiLayerSpectrum;
use mzpeaks::{CentroidPeak, DeconvolutedPeak};

pub type CPeak = CentroidPeak;
pub type DPeak = DeconvolutedPeak;
pub type SpectrumType = MultiLayerSpectrum<CPeak, DPeak>;
pub(crate) const STDIN_BUFFER_SIZE: usize = 2usize.pow(20);
