//! Built-in prelude
//!
//! The prelude is ordinary SPP source generated into the `std` namespace
//! before anything else. Operators lower to the methods declared here, so
//! `a + b` on two `Num`s resolves to `Num.add`.

/// Display name of the prelude in diagnostics
pub const PRELUDE_NAME: &str = "<std>";

pub const PRELUDE: &str = r#"
mod std;

cls Void {}
cls Bool {}
cls Num {}
cls Str {}
cls Rgx {}
cls Arr[T] {}
cls Gen[T] {}

sup Bool {
    @meta.abstract_method fn and(&self, other: Bool) -> Bool;
    @meta.abstract_method fn or(&self, other: Bool) -> Bool;
    @meta.abstract_method fn not(&self) -> Bool;
    @meta.abstract_method fn eq(&self, other: Bool) -> Bool;
    @meta.abstract_method fn ne(&self, other: Bool) -> Bool;
}

sup Num {
    @meta.abstract_method fn add(&self, other: Num) -> Num;
    @meta.abstract_method fn sub(&self, other: Num) -> Num;
    @meta.abstract_method fn mul(&self, other: Num) -> Num;
    @meta.abstract_method fn div(&self, other: Num) -> Num;
    @meta.abstract_method fn rem(&self, other: Num) -> Num;
    @meta.abstract_method fn neg(&self) -> Num;
    @meta.abstract_method fn eq(&self, other: Num) -> Bool;
    @meta.abstract_method fn ne(&self, other: Num) -> Bool;
    @meta.abstract_method fn lt(&self, other: Num) -> Bool;
    @meta.abstract_method fn le(&self, other: Num) -> Bool;
    @meta.abstract_method fn gt(&self, other: Num) -> Bool;
    @meta.abstract_method fn ge(&self, other: Num) -> Bool;
}

sup Str {
    @meta.abstract_method fn add(&self, other: Str) -> Str;
    @meta.abstract_method fn eq(&self, other: Str) -> Bool;
    @meta.abstract_method fn ne(&self, other: Str) -> Bool;
    @meta.abstract_method fn lt(&self, other: Str) -> Bool;
    @meta.abstract_method fn gt(&self, other: Str) -> Bool;
    @meta.abstract_method fn len(&self) -> Num;
}

sup Rgx {
    @meta.abstract_method fn matches(&self, text: Str) -> Bool;
}

sup[T] Arr[T] {
    @meta.abstract_method fn len(&self) -> Num;
    @meta.abstract_method fn get(&self, index: Num) -> T;
    @meta.abstract_method fn push(&mut self, value: T);
    @meta.abstract_method fn pop(&mut self) -> T;
}

sup[T] Gen[T] {
    @meta.abstract_method fn next(&mut self) -> T;
}
"#;

/// Names the prelude makes visible in the global scope
pub const PRELUDE_TYPES: &[&str] = &["Void", "Bool", "Num", "Str", "Rgx", "Arr", "Gen"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_parses() {
        let program = spp_parser::parse_source(PRELUDE, 0).expect("prelude must parse");
        let module: Vec<&str> = program
            .module_name
            .as_ref()
            .map(|m| m.value.iter().map(|i| i.name.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(module, vec!["std"]);
        assert_eq!(program.members.len(), PRELUDE_TYPES.len() + 6);
    }
}
