//! 大小写/重音折叠：预测时按配置决定是否区分。

/// 去掉常见拉丁字母上的重音符号（`é` -> `e`，`Ü` -> `U`），其余字符原样保留。
pub fn fold_accents(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// 按匹配选项规范化一个词。
pub fn normalize(word: &str, case_sensitive: bool, accent_sensitive: bool) -> String {
    let word = if case_sensitive {
        word.to_string()
    } else {
        word.to_lowercase()
    };
    if accent_sensitive {
        word
    } else {
        fold_accents(&word)
    }
}

fn fold_char(c: char) -> char {
    if c.is_ascii() {
        return c;
    }
    let lower = c.to_lowercase().next().unwrap_or(c);
    let base = match lower {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' => 's',
        'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => return c,
    };
    if c.is_uppercase() {
        base.to_ascii_uppercase()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents_keeping_case() {
        assert_eq!(fold_accents("Crème Brûlée"), "Creme Brulee");
        assert_eq!(fold_accents("ÜBER straße"), "UBER straße");
    }

    #[test]
    fn normalize_by_options() {
        assert_eq!(normalize("Café", true, true), "Café");
        assert_eq!(normalize("Café", false, true), "café");
        assert_eq!(normalize("Café", true, false), "Cafe");
        assert_eq!(normalize("Café", false, false), "cafe");
    }
}
