use heck::{ToSnakeCase, ToUpperCamelCase};

pub fn snake_case(src: &str) -> String {
    src.to_snake_case()
}

pub fn upper_camel_case(src: &str) -> String {
    src.to_upper_camel_case()
}

pub fn pluralize(word: &str) -> String {
    pluralizer::pluralize(word, 2, false)
}

pub fn singularize(word: &str) -> String {
    pluralizer::pluralize(word, 1, false)
}
