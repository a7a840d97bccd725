//! Address words that are too common to be worth highlighting or matching on.

pub const ADDRESS_STOPWORDS: &[&str] = &[
    "ао", "аобл", "дом", "респ", "а/я", "аал", "автодорога", "аллея", "арбан", "аул", "б-р",
    "берег", "бугор", "вал", "вл", "волость", "въезд", "высел", "г", "городок", "гск", "д",
    "двлд", "днп", "дор", "дп", "ж/д_будка", "ж/д_казарм", "ж/д_оп", "ж/д_платф", "ж/д_пост",
    "ж/д_рзд", "ж/д_ст", "жилзона", "жилрайон", "жт", "заезд", "заимка", "зона", "к",
    "казарма", "канал", "кв", "кв-л", "км", "кольцо", "комн", "кордон", "коса", "кп", "край",
    "линия", "лпх", "м", "массив", "местность", "мкр", "мост", "н/п", "наб", "нп", "обл",
    "округ", "остров", "оф", "п", "п/о", "п/р", "п/ст", "парк", "пгт", "пер", "переезд", "пл",
    "пл-ка", "платф", "погост", "полустанок", "починок", "пр-кт", "проезд", "промзона",
    "просек", "просека", "проселок", "проток", "протока", "проулок", "р-н", "рзд", "россия",
    "рп", "ряды", "с", "с/а", "с/мо", "с/о", "с/п", "с/с", "сад", "сквер", "сл", "снт",
    "спуск", "ст", "ст-ца", "стр", "тер", "тракт", "туп", "у", "ул", "уч-к", "ф/х", "ферма",
    "х", "ш", "бульвар", "владение", "выселки", "гаражно-строительный", "город", "деревня",
    "домовладение", "дорога", "квартал", "километр", "комната", "корпус", "литер",
    "леспромхоз", "местечко", "микрорайон", "набережная", "область", "переулок", "платформа",
    "площадка", "площадь", "поселение", "поселок", "проспект", "разъезд", "район",
    "республика", "село", "сельсовет", "слобода", "сооружение", "станица", "станция",
    "строение", "территория", "тупик", "улица", "улус", "участок", "хутор", "шоссе",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwords_are_normalized() {
        for word in ADDRESS_STOPWORDS {
            assert_eq!(*word, crate::charset::format_token(word));
        }
    }

    #[test]
    fn test_common_types_present() {
        for word in ["г", "ул", "д", "кв", "обл", "р-н"] {
            assert!(ADDRESS_STOPWORDS.contains(&word));
        }
    }
}
