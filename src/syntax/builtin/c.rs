//! C/C++ language definition

use super::multi_line;
use super::generic::function_call;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::rules::{GroupAction, Rule};

/// Create C language definition (also works for C++)
pub fn c_language() -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("c").with_base("generic");
    lang.add_extension("c");
    lang.add_extension("h");
    lang.add_extension("cpp");
    lang.add_extension("hpp");
    lang.add_extension("cc");
    lang.add_extension("cxx");
    lang.add_alias("cpp");
    lang.add_alias("c++");

    // #include <header>
    lang.add_rule(Rule::groups(
        multi_line(r"^[ \t]*(#[ \t]*include)[ \t]*(&lt;[^&\n]*&gt;)"),
        [
            (1, GroupAction::tag("meta.preprocessor")),
            (2, GroupAction::tag("string.include")),
        ],
    ));
    lang.add_rule(Rule::tag("meta.preprocessor", multi_line(r"^[ \t]*#[ \t]*\w+")));

    let keywords = r"\b(?:auto|char|enum|extern|float|double|goto|inline|int|long|register|restrict|short|signed|sizeof|struct|typedef|union|unsigned|volatile|_Alignas|_Alignof|_Atomic|_Bool|_Complex|_Generic|_Imaginary|_Noreturn|_Static_assert|_Thread_local)\b";
    lang.add_rule(Rule::tag("keyword", keywords));

    // C++ keywords
    let cpp_keywords = r"\b(?:alignas|alignof|asm|bool|class|concept|consteval|constexpr|constinit|const_cast|co_await|co_return|co_yield|decltype|dynamic_cast|explicit|export|friend|mutable|namespace|noexcept|nullptr|operator|private|protected|public|reinterpret_cast|requires|static_assert|static_cast|template|this|thread_local|typeid|typename|using|virtual)\b";
    lang.add_rule(Rule::tag("keyword", cpp_keywords));

    // Type names (standard types)
    let types = r"\b(?:size_t|ptrdiff_t|intptr_t|uintptr_t|int8_t|int16_t|int32_t|int64_t|uint8_t|uint16_t|uint32_t|uint64_t|FILE|NULL)\b";
    lang.add_rule(Rule::tag("support.type", types));
    lang.add_rule(function_call());

    lang
}
