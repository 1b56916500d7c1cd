//! Curated Gilmorehill campus landmarks
//!
//! The gazetteer searched before any remote geocoding, and the markers
//! shown on the map with their accessibility popups.

use crate::core::locale::{Language, Locale};
use crate::core::map::{LngLat, MapSurface, MarkerId, MarkerSpec, MarkerStyle};

/// Accessibility attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Yes,
    No,
    PartialAssisted,
    NotApplicable,
}

impl Access {
    /// Key into the locale's yes/no value table
    pub fn value_key(self) -> &'static str {
        match self {
            Access::Yes => "Yes",
            Access::No => "No",
            Access::PartialAssisted => "Partial/Assisted",
            Access::NotApplicable => "N/A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Campus,
    Museum,
    Transport,
    Gate,
}

impl Category {
    /// Marker glyph
    pub fn glyph(self) -> &'static str {
        match self {
            Category::Campus => "🎓",
            Category::Museum => "🏛️",
            Category::Transport => "🚇",
            Category::Gate => "🚪",
        }
    }
}

/// Text available in both interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalizedText {
    pub en: &'static str,
    pub zh: &'static str,
}

impl LocalizedText {
    /// Text in `lang`, English when that translation is empty
    pub fn get(&self, lang: Language) -> &'static str {
        match lang {
            Language::Zh if !self.zh.is_empty() => self.zh,
            _ => self.en,
        }
    }
}

/// Fixed point of interest with accessibility metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub name: &'static str,
    pub coordinate: LngLat,
    pub description: LocalizedText,
    pub elevator: Access,
    pub ramp: Access,
    pub accessible_toilet: Access,
    pub category: Category,
}

impl Landmark {
    /// Popup body: name, description, then one line per accessibility attribute
    pub fn popup_text(&self, locale: &Locale) -> String {
        let mut lines = vec![self.name.to_string()];
        let description = self.description.get(locale.language());
        if !description.is_empty() {
            lines.push(description.to_string());
        }
        for (label_key, value) in [
            ("elev", self.elevator),
            ("ramp", self.ramp),
            ("at", self.accessible_toilet),
        ] {
            lines.push(format!(
                "{}: {}",
                locale.localize(label_key),
                locale.localize_value(value.value_key())
            ));
        }
        lines.join("\n")
    }

    fn marker_spec(&self, locale: &Locale) -> MarkerSpec {
        MarkerSpec {
            at: self.coordinate,
            style: MarkerStyle::Glyph {
                glyph: self.category.glyph(),
                title: self.name.to_string(),
            },
            popup: Some(self.popup_text(locale)),
        }
    }
}

/// Landmark marker placed on the map
#[derive(Debug, Clone, Copy)]
pub struct PlacedLandmark {
    pub marker: MarkerId,
    pub landmark: &'static Landmark,
}

/// Place one marker per landmark
pub fn render_landmarks<M: MapSurface>(
    landmarks: &'static [Landmark],
    map: &mut M,
    locale: &Locale,
) -> Vec<PlacedLandmark> {
    landmarks
        .iter()
        .map(|landmark| PlacedLandmark {
            marker: map.add_marker(landmark.marker_spec(locale)),
            landmark,
        })
        .collect()
}

/// Rewrite every popup in the current language
pub fn refresh_popups<M: MapSurface>(placed: &[PlacedLandmark], map: &mut M, locale: &Locale) {
    for entry in placed {
        map.set_popup(entry.marker, &entry.landmark.popup_text(locale));
    }
}

const fn lm(
    name: &'static str,
    coordinate: [f64; 2],
    en: &'static str,
    zh: &'static str,
    access: [Access; 3],
    category: Category,
) -> Landmark {
    Landmark {
        name,
        coordinate: LngLat::new(coordinate[0], coordinate[1]),
        description: LocalizedText { en, zh },
        elevator: access[0],
        ramp: access[1],
        accessible_toilet: access[2],
        category,
    }
}

use Access::{No, PartialAssisted, Yes};

/// The campus gazetteer
pub static LANDMARKS: [Landmark; 20] = [
    lm(
        "University of Glasgow Library",
        [-4.28898, 55.87320],
        "The university's main library with extensive academic resources and study spaces.",
        "格拉斯哥大学的主图书馆，拥有丰富的学术资源和学习空间。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Molema Building",
        [-4.2927, 55.87395],
        "School of Geographical and Earth Sciences main building.",
        "地理与地球科学学院主楼。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "James McCune Smith Learning Hub",
        [-4.29167, 55.87302],
        "Large modern learning facility offering various flexible teaching and study spaces.",
        "大型现代化学习设施，提供各种灵活的教学和学习空间。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Bower Building",
        [-4.29167, 55.87245],
        "Teaching and research facility for the School of Life Sciences.",
        "生命科学学院的教学与科研楼。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Boyd Orr Building",
        [-4.2927, 55.87355],
        "Science teaching and labs; high-rise building facing University Avenue.",
        "科学教学和实验室；面向大学大道的高层建筑。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Fraser Building",
        [-4.28780, 55.87310],
        "Student services, catering and retail; step-free access at ground level.",
        "提供学生服务、餐饮和零售；有地面无障碍通道。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "James Watt South Building",
        [-4.28655, 55.87113],
        "Major Engineering building adjacent to Rankine.",
        "工程学院主要教学楼。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Joseph Black Building (Chemistry)",
        [-4.29299, 55.87208],
        "School of Chemistry and associated laboratories.",
        "化学学院及相关实验室。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Rankine Building (Engineering)",
        [-4.28559, 55.87245],
        "Engineering teaching and research building close to University Avenue.",
        "靠近大学路的工程教学科研大楼。",
        [Yes, Yes, No],
        Category::Campus,
    ),
    lm(
        "Kelvin Building",
        [-4.29130, 55.87175],
        "Home to Physics & Astronomy; north side of University Avenue.",
        "物理学和天文学研究中心；位于大学大道北侧。",
        [Yes, Yes, No],
        Category::Campus,
    ),
    lm(
        "Stair Building (Mathematics & Statistics)",
        [-4.2905, 55.87175],
        "Teaching and offices for the School of Mathematics & Statistics.",
        "数学与统计学院的教学和办公室。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Advanced Research Building",
        [-4.29580, 55.87145],
        "A modern facility at the University of Glasgow dedicated to interdisciplinary research and innovation.",
        "格拉斯哥大学的现代化设施，致力于跨学科研究和创新。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "School of Mathematics and Statistics",
        [-4.29440, 55.87245],
        "Modern teaching and offices of the School of Mathematics and Statistics.",
        "数学与统计学院的现代化教学和办公室。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "McMillan Reading Room",
        [-4.28801, 55.87271],
        "Quiet study space between the Main Building and the Library.",
        "主楼和图书馆之间安静的学习空间。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Wolfson Medical School Building",
        [-4.29310, 55.87302],
        "Dedicated to medical education with advanced simulation facilities.",
        "拥有先进模拟设施的医学教育设施。",
        [Yes, Yes, Yes],
        Category::Campus,
    ),
    lm(
        "Hunterian Art Museum",
        [-4.28835, 55.87180],
        "Scotland's oldest public museum, located within the Gilbert Scott Building.",
        "位于 Gilbert Scott Building 内的苏格兰最古老公立博物馆。",
        [Yes, Yes, No],
        Category::Museum,
    ),
    lm(
        "Kelvingrove Art Gallery and Museum",
        [-4.29110, 55.86850],
        "Major civic museum beside Kelvingrove Park with art and natural history collections.",
        "凯尔文格罗夫公园旁的大型市民博物馆，收藏艺术品和自然历史藏品。",
        [Yes, Yes, Yes],
        Category::Museum,
    ),
    lm(
        "Kelvinhall Station",
        [-4.29969, 55.87102],
        "Glasgow Subway station serving the West End, near Kelvingrove Park and the University.",
        "服务西区的地铁站，靠近凯尔文格罗夫公园与校园。",
        [No, No, No],
        Category::Transport,
    ),
    lm(
        "Hillhead Subway Station",
        [-4.29329, 55.87519],
        "Subway Circle line station on Byres Road; step-free from street to concourse.",
        "拜尔斯路 (Byres Road) 上的地铁环线站；从街道到大厅无台阶。",
        [PartialAssisted, Yes, No],
        Category::Transport,
    ),
    lm(
        "Partick Station",
        [-4.30939, 55.87],
        "Major transport hub connecting ScotRail, the Glasgow Subway, and local buses.",
        "连接苏格兰铁路、格拉斯哥地铁和当地公交车的主要交通枢纽。",
        [Yes, Yes, Yes],
        Category::Transport,
    ),
];
