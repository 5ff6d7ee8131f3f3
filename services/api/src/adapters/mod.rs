pub mod word_list;
pub mod wordnik;

pub use word_list::WordListAdapter;
pub use wordnik::WordnikAdapter;
