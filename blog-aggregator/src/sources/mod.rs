pub mod note;
pub mod qiita;
pub mod zenn;

pub use note::{NoteArticle, NoteProvider};
pub use qiita::{QiitaItem, QiitaProvider};
pub use zenn::{ZennArticle, ZennProvider};
