use wasm_bindgen::JsValue;

#[derive(Debug)]
pub enum Gpx2SceneError {
    XmlParse(quick_xml::Error),
    MissingRoot,
    ContentOutsideRoot,
    UnclosedElement {
        name: String,
    },
    TooDeep {
        limit: usize,
    },
    InvalidOption {
        option: &'static str,
        value: f64,
    },
}

impl std::fmt::Display for Gpx2SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XmlParse(e) => write!(f, "XML parse error: {e}"),
            Self::MissingRoot => write!(f, "Document has no root element"),
            Self::ContentOutsideRoot => {
                write!(f, "Content found outside the document root element")
            }
            Self::UnclosedElement { name } => write!(f, "Element <{name}> is never closed"),
            Self::TooDeep { limit } => {
                write!(f, "Elements nested deeper than {limit} levels")
            }
            Self::InvalidOption { option, value } => {
                write!(f, "Invalid value {value} for option '{option}'")
            }
        }
    }
}

impl std::error::Error for Gpx2SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::XmlParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for Gpx2SceneError {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlParse(e)
    }
}

impl From<Gpx2SceneError> for JsValue {
    fn from(e: Gpx2SceneError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
