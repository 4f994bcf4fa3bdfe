//! Bundled translations
//!
//! Shipped with the binary and used whenever the backend cannot be reached.
//! Only UI strings and pillar names are bundled; questions and
//! recommendations always come from the backend.

use super::types::{ContentType, Language, LocalizedContent};

const EN_STRINGS: &[(&str, &str)] = &[
    ("app.title", "Financial Health Assessment"),
    ("app.tagline", "Understand your financial wellbeing in a few minutes"),
    ("nav.start_survey", "Start Assessment"),
    ("nav.results", "My Results"),
    ("nav.history", "Score History"),
    ("nav.logout", "Log out"),
    ("survey.next", "Next"),
    ("survey.back", "Back"),
    ("survey.submit", "Submit"),
    ("survey.progress", "Step {current} of {total}"),
    ("survey.answer_all", "Please answer all questions in this step"),
    ("survey.saved", "Your progress has been saved"),
    ("results.title", "Your Financial Health Score"),
    ("results.overall", "Overall score: {score}%"),
    ("results.retake", "Retake Assessment"),
    ("results.none", "No results found. Please take the assessment first."),
    ("results.register_prompt", "Create an account to keep your results and track progress"),
    ("auth.email_label", "Email address"),
    ("auth.send_code", "Send Code"),
    ("auth.code_label", "Verification code"),
    ("auth.verify", "Verify"),
    ("auth.code_sent", "We sent a 6-digit code to {email}"),
    ("auth.resend", "Resend code"),
    ("auth.resend_in", "Resend code in {seconds}s"),
    ("auth.code_expires_in", "Code expires in {minutes}:{seconds}"),
    ("auth.invalid_email", "Please enter a valid email address"),
    ("auth.invalid_code", "The code must be 6 digits"),
    ("consent.title", "Your Privacy"),
    ("consent.profiling", "I agree to the use of my answers to build my financial profile"),
    ("consent.data_processing", "I agree to the processing of my personal data under the UAE PDPL"),
    ("consent.accept", "Accept and Continue"),
    ("consent.required", "Consent is required to continue"),
    ("interpretation.excellent", "Excellent"),
    ("interpretation.good", "Good"),
    ("interpretation.needs_improvement", "Needs Improvement"),
    ("interpretation.at_risk", "At Risk"),
    ("report.download_pdf", "Download PDF Report"),
    ("report.email", "Email Report"),
    ("report.email_sent", "Your report has been sent to {email}"),
    ("error.network", "We could not reach the server. Please try again."),
    ("error.generic", "Something went wrong. Please try again."),
];

const AR_STRINGS: &[(&str, &str)] = &[
    ("app.title", "تقييم الصحة المالية"),
    ("app.tagline", "تعرّف على وضعك المالي في دقائق"),
    ("nav.start_survey", "ابدأ التقييم"),
    ("nav.results", "نتائجي"),
    ("nav.history", "سجل النتائج"),
    ("nav.logout", "تسجيل الخروج"),
    ("survey.next", "التالي"),
    ("survey.back", "السابق"),
    ("survey.submit", "إرسال"),
    ("survey.progress", "الخطوة {current} من {total}"),
    ("survey.answer_all", "يرجى الإجابة على جميع الأسئلة في هذه الخطوة"),
    ("survey.saved", "تم حفظ تقدمك"),
    ("results.title", "نتيجة صحتك المالية"),
    ("results.overall", "النتيجة الإجمالية: {score}%"),
    ("results.retake", "إعادة التقييم"),
    ("results.none", "لا توجد نتائج. يرجى إجراء التقييم أولاً."),
    ("results.register_prompt", "أنشئ حساباً للاحتفاظ بنتائجك ومتابعة تقدمك"),
    ("auth.email_label", "البريد الإلكتروني"),
    ("auth.send_code", "إرسال الرمز"),
    ("auth.code_label", "رمز التحقق"),
    ("auth.verify", "تحقق"),
    ("auth.code_sent", "أرسلنا رمزاً مكوناً من 6 أرقام إلى {email}"),
    ("auth.resend", "إعادة إرسال الرمز"),
    ("auth.resend_in", "إعادة الإرسال خلال {seconds} ثانية"),
    ("auth.code_expires_in", "تنتهي صلاحية الرمز خلال {minutes}:{seconds}"),
    ("auth.invalid_email", "يرجى إدخال بريد إلكتروني صحيح"),
    ("auth.invalid_code", "يجب أن يتكون الرمز من 6 أرقام"),
    ("consent.title", "خصوصيتك"),
    ("consent.profiling", "أوافق على استخدام إجاباتي لبناء ملفي المالي"),
    ("consent.data_processing", "أوافق على معالجة بياناتي الشخصية وفق قانون حماية البيانات الشخصية في الإمارات"),
    ("consent.accept", "موافق ومتابعة"),
    ("consent.required", "الموافقة مطلوبة للمتابعة"),
    ("interpretation.excellent", "ممتاز"),
    ("interpretation.good", "جيد"),
    ("interpretation.needs_improvement", "يحتاج إلى تحسين"),
    ("interpretation.at_risk", "في خطر"),
    ("report.download_pdf", "تحميل التقرير PDF"),
    ("report.email", "إرسال التقرير بالبريد"),
    ("report.email_sent", "تم إرسال تقريرك إلى {email}"),
    ("error.network", "تعذر الاتصال بالخادم. يرجى المحاولة مرة أخرى."),
    ("error.generic", "حدث خطأ ما. يرجى المحاولة مرة أخرى."),
];

const EN_PILLARS: &[(&str, &str)] = &[
    ("budgeting", "Budgeting"),
    ("savings_habit", "Savings Habit"),
    ("debt_management", "Debt Management"),
    ("financial_planning", "Financial Planning"),
    ("investment_knowledge", "Investment Knowledge"),
    ("retirement_planning", "Retirement Planning"),
    ("protection", "Financial Protection"),
    ("income_stream", "Income Stream"),
];

const AR_PILLARS: &[(&str, &str)] = &[
    ("budgeting", "إعداد الميزانية"),
    ("savings_habit", "عادات الادخار"),
    ("debt_management", "إدارة الديون"),
    ("financial_planning", "التخطيط المالي"),
    ("investment_knowledge", "المعرفة الاستثمارية"),
    ("retirement_planning", "التخطيط للتقاعد"),
    ("protection", "الحماية المالية"),
    ("income_stream", "مصادر الدخل"),
];

/// Bundled UI strings for a language
pub fn bundled_strings(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::En => EN_STRINGS,
        Language::Ar => AR_STRINGS,
    }
}

fn bundled_pillars(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::En => EN_PILLARS,
        Language::Ar => AR_PILLARS,
    }
}

/// Look up a single bundled UI string
pub fn bundled_string(language: Language, key: &str) -> Option<&'static str> {
    bundled_strings(language)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Bundled content for a (type, language) pair; empty when nothing is bundled
pub fn bundled_content(content_type: ContentType, language: Language) -> Vec<LocalizedContent> {
    let table = match content_type {
        ContentType::Ui => bundled_strings(language),
        ContentType::Pillar => bundled_pillars(language),
        _ => return Vec::new(),
    };

    table
        .iter()
        .map(|(key, text)| LocalizedContent::new(content_type, *key, language, *text))
        .collect()
}
