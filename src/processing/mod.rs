pub mod extractors;
pub mod fetch;
pub mod image;
#[cfg(feature = "local-ocr")]
pub mod local_ocr;
pub mod ocr;

pub use self::extractors::{IdentityExtractor, TextLayout};
pub use self::fetch::{ImageFetcher, ImageSource};
pub use self::image::ImageProcessor;
#[cfg(feature = "local-ocr")]
pub use self::local_ocr::TesseractRecognizer;
pub use self::ocr::{OcrSpaceClient, TextRecognizer};
