use crate::config::{Button, UnknownName};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Lang {
    #[default]
    Cn,
    En,
}

impl FromStr for Lang {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Lang, UnknownName> {
        match s {
            "cn" => Ok(Lang::Cn),
            "en" => Ok(Lang::En),
            _ => Err(UnknownName::new("language", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tools {
    pub confirm: &'static str,
    pub clear: &'static str,
    pub now: &'static str,
}

/// User-visible text for one language.  Multi-line messages use `\n`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct I18n {
    pub lang: Lang,
    /// Sunday first
    pub weeks: [&'static str; 7],
    pub months: [&'static str; 12],
    /// Hours, minutes, seconds column titles
    pub time: [&'static str; 3],
    pub time_tips: &'static str,
    pub back_to_date: &'static str,
    pub preview: &'static str,
    pub start_time: &'static str,
    pub end_time: &'static str,
    pub date_tips: &'static str,
    pub month_tips: &'static str,
    pub year_tips: &'static str,
    pub duration: &'static str,
    pub tools: Tools,
    /// Contains `{min}` and `{max}` placeholders
    pub invalid_range: &'static str,
    pub invalid_date: &'static str,
    pub invalid_end_early: &'static str,
}

static CN: I18n = I18n {
    lang: Lang::Cn,
    weeks: ["日", "一", "二", "三", "四", "五", "六"],
    months: [
        "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
    ],
    time: ["时", "分", "秒"],
    time_tips: "选择时间",
    back_to_date: "返回日期",
    preview: "结果预览",
    start_time: "开始时间",
    end_time: "结束时间",
    date_tips: "选择日期",
    month_tips: "选择月份",
    year_tips: "选择年份",
    duration: "时长",
    tools: Tools {
        confirm: "确定",
        clear: "清空",
        now: "现在",
    },
    invalid_range: "日期可选值设定在\n{min} 到 {max}",
    invalid_date: "此日期不可选",
    invalid_end_early: "结束时间不能早于开始时间\n请重新选择",
};

static EN: I18n = I18n {
    lang: Lang::En,
    weeks: ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
    months: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    time: ["Hours", "Minutes", "Seconds"],
    time_tips: "Select Time",
    back_to_date: "Back to Date",
    preview: "Preview",
    start_time: "Start Time",
    end_time: "End Time",
    date_tips: "Select Date",
    month_tips: "Select Month",
    year_tips: "Select Year",
    duration: "Duration",
    tools: Tools {
        confirm: "Confirm",
        clear: "Clear",
        now: "Now",
    },
    invalid_range: "Date range limit set to\n{min} - {max}",
    invalid_date: "Date is unavailable",
    invalid_end_early: "End time cannot be earlier than start time\nPlease reselect",
};

impl I18n {
    pub fn for_lang(lang: Lang) -> &'static I18n {
        match lang {
            Lang::Cn => &CN,
            Lang::En => &EN,
        }
    }

    pub fn format_year(&self, year: i32) -> String {
        match self.lang {
            Lang::Cn => format!("{year}年"),
            Lang::En => year.to_string(),
        }
    }

    /// Name of the 0-based `month`
    pub fn format_month(&self, month: u8) -> &'static str {
        self.months[usize::from(month.min(11))]
    }

    /// The range-limit message with whichever bounds are known filled in
    pub fn invalid_range_message(&self, min: Option<&str>, max: Option<&str>) -> String {
        let mut msg = self.invalid_range.to_owned();
        if let Some(min) = min {
            msg = msg.replace("{min}", min);
        }
        if let Some(max) = max {
            msg = msg.replace("{max}", max);
        }
        msg
    }

    /// Weekday names starting from `week_start` (0 = Sunday)
    pub fn week_headers(&self, week_start: u8) -> [&'static str; 7] {
        let mut weeks = self.weeks;
        weeks.rotate_left(usize::from(week_start % 7));
        weeks
    }

    pub fn button_label(&self, button: Button) -> &'static str {
        match button {
            Button::Clear => self.tools.clear,
            Button::Now => self.tools.now,
            Button::Confirm => self.tools.confirm,
        }
    }
}
