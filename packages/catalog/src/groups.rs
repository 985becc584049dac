use serde::Serialize;

/// One cataloged people. Referenced from posts and quiz attempts by `id`.
#[derive(Clone, Copy, Debug, Serialize, utoipa::ToSchema)]
pub struct EthnicGroup {
    /// Stable slug used as a foreign-key-like reference from posts.
    pub id: &'static str,
    pub name: &'static str,
    /// Primary region of settlement.
    pub region: &'static str,
    pub summary: &'static str,
}

pub static GROUPS: &[EthnicGroup] = &[
    EthnicGroup {
        id: "tatars",
        name: "Татары",
        region: "Республика Татарстан",
        summary: "Второй по численности народ России. Богатые традиции \
                  тюркской культуры: Сабантуй, эчпочмак, казанский кремль.",
    },
    EthnicGroup {
        id: "bashkirs",
        name: "Башкиры",
        region: "Республика Башкортостан",
        summary: "Народ Южного Урала, знаменитый башкирским мёдом, кураем и \
                  эпосом «Урал-батыр».",
    },
    EthnicGroup {
        id: "chuvash",
        name: "Чуваши",
        region: "Чувашская Республика",
        summary: "Потомки волжских булгар, единственный тюркский народ с \
                  преобладанием православия. Известны вышивкой и пивоварением.",
    },
    EthnicGroup {
        id: "mari",
        name: "Марийцы",
        region: "Республика Марий Эл",
        summary: "Финно-угорский народ Поволжья, сохранивший традиционную \
                  языческую веру и священные рощи.",
    },
    EthnicGroup {
        id: "udmurts",
        name: "Удмурты",
        region: "Удмуртская Республика",
        summary: "Финно-угорский народ Предуралья. Перепечи, крезь и самый \
                  рыжеволосый народ России.",
    },
    EthnicGroup {
        id: "komi",
        name: "Коми",
        region: "Республика Коми",
        summary: "Северный финно-угорский народ, охотники и оленеводы тайги и \
                  тундры, создатели древней анбурской письменности.",
    },
    EthnicGroup {
        id: "karelians",
        name: "Карелы",
        region: "Республика Карелия",
        summary: "Народ озёрного края, родина рун «Калевалы», калиток и \
                  деревянного зодчества Кижей.",
    },
    EthnicGroup {
        id: "sakha",
        name: "Якуты (саха)",
        region: "Республика Саха (Якутия)",
        summary: "Самый северный тюркский народ, коневоды вечной мерзлоты. \
                  Эпос олонхо и праздник Ысыах.",
    },
    EthnicGroup {
        id: "buryats",
        name: "Буряты",
        region: "Республика Бурятия",
        summary: "Монгольский народ Прибайкалья, носители буддийской традиции \
                  России. Эпос «Гэсэр», буузы и Иволгинский дацан.",
    },
    EthnicGroup {
        id: "kalmyks",
        name: "Калмыки",
        region: "Республика Калмыкия",
        summary: "Единственный буддийский народ Европы, потомки ойратов, \
                  мастера протяжной песни и эпоса «Джангар».",
    },
    EthnicGroup {
        id: "ossetians",
        name: "Осетины",
        region: "Республика Северная Осетия — Алания",
        summary: "Потомки алан, хранители нартского эпоса и традиции трёх \
                  пирогов.",
    },
    EthnicGroup {
        id: "nenets",
        name: "Ненцы",
        region: "Ямало-Ненецкий автономный округ",
        summary: "Крупнейший из коренных малочисленных народов Севера, \
                  кочевые оленеводы тундры, живущие в чумах.",
    },
];

/// All cataloged groups, in display order.
pub fn all_groups() -> &'static [EthnicGroup] {
    GROUPS
}

/// Look up a group by slug. Unknown slugs are a normal condition, not an
/// error: posts may reference a group that was renamed or removed.
pub fn find_group(id: &str) -> Option<&'static EthnicGroup> {
    GROUPS.iter().find(|g| g.id == id)
}
